fn main() -> anyhow::Result<()> {
    cmpcodes::run_cli()
}
