//! Command-line front end: dumps trees, checks files and resolves codes with
//! prompts on stdin.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};

use crate::database::CodeDatabase;
use crate::joker::{Controller, JokerOptions, JokerPlatform, WiiLayout, joker_value};
use crate::resolver::{
    GridChoice, GridRequest, JokerRequest, ListRequest, Outcome, Prompter, ValueRequest,
};
use crate::settings::Settings;
use crate::statics;
use crate::tree::{CodeTree, NodeKind};

#[derive(Parser)]
#[command(name = "cmpcodes")]
#[command(about = "CMP Codes: browse and fill in cheat code files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LayoutArg {
    Wiimote,
    Classic,
    Gamecube,
}

impl From<LayoutArg> for WiiLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Wiimote => WiiLayout::Wiimote,
            LayoutArg::Classic => WiiLayout::Classic,
            LayoutArg::Gamecube => WiiLayout::GameCube,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the group/code tree with badges
    Tree {
        /// Code file
        file: PathBuf,

        /// Dump tree, mods and game info as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// List codes that still need input before they can be copied
    Check {
        /// Code file
        file: PathBuf,
    },

    /// Fill in one code's placeholders interactively
    Resolve {
        /// Code file
        file: PathBuf,

        /// Code path, e.g. "Stats/Max HP"
        path: String,

        /// Byte offset to start resolving from
        #[arg(long, default_value_t = 0)]
        cursor: usize,

        /// Layout for Wii joker tags without a layout mod
        #[arg(long, value_enum, default_value = "wiimote")]
        wii_layout: LayoutArg,

        /// Invert joker masks where the platform allows it
        #[arg(long)]
        reverse: bool,
    },

    /// Compute a joker mask for a button combination
    Joker {
        /// ps2, gc, wii or gba
        platform: String,

        /// Buttons to hold
        buttons: Vec<String>,

        /// Layout used when platform is wii
        #[arg(long, value_enum, default_value = "wiimote")]
        wii_layout: LayoutArg,

        /// Swap GameCube bytes
        #[arg(long)]
        le: bool,

        /// Invert the mask
        #[arg(long)]
        reverse: bool,
    },
}

impl Commands {
    fn execute(self) -> anyhow::Result<()> {
        match self {
            Commands::Tree { file, json } => {
                let db = load(&file, &Settings::default())?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&db)?);
                } else {
                    print!("{}", render_tree(&db.tree));
                }
            }
            Commands::Check { file } => {
                let db = load(&file, &Settings::default())?;
                let pending = db.unresolved_codes();
                for id in &pending {
                    println!("{}", db.tree.path(*id));
                }
                println!("{} of {} codes need input", pending.len(), db.tree.codes().count());
            }
            Commands::Resolve {
                file,
                path,
                cursor,
                wii_layout,
                reverse,
            } => {
                let settings = Settings {
                    wii_layout: wii_layout.into(),
                    reverse_joker: reverse,
                    ..Settings::default()
                };
                let mut db = load(&file, &settings)?;
                let id = db.find_code(&path)?;
                let stdin = io::stdin();
                let mut prompter = LinePrompter::new(stdin.lock(), io::stdout());
                let report = db.resolve(id, cursor, &settings, &mut prompter)?;
                let code = db.code(id)?;
                println!("{}", code.display_name());
                println!("{}", code.working_text);
                match report.outcome {
                    Outcome::Completed => {}
                    Outcome::Cancelled => eprintln!("cancelled"),
                    Outcome::UnknownTag(tag) => bail!("{}: [{tag}]", statics::EN_UNKNOWN_TAG),
                }
            }
            Commands::Joker {
                platform,
                buttons,
                wii_layout,
                le,
                reverse,
            } => {
                let platform = JokerPlatform::parse(&platform)
                    .with_context(|| format!("unknown platform '{platform}'"))?;
                let controller = Controller::for_platform(platform, wii_layout.into())
                    .context("pick a concrete platform")?;
                let pressed = split_buttons(&buttons.join(" "));
                let options = JokerOptions {
                    little_endian: le,
                    reverse,
                };
                let value = joker_value(controller, &pressed, options)?;
                println!("{value}  ({})", controller.press_label(&pressed));
            }
        }
        Ok(())
    }
}

fn load(file: &Path, settings: &Settings) -> anyhow::Result<CodeDatabase> {
    CodeDatabase::load_path(file, settings).with_context(|| format!("loading {file:?}"))
}

/// Indented outline, two spaces per level, badges after the name.
fn render_tree(tree: &CodeTree) -> String {
    let mut out = format!("{}\n", tree.get(tree.root()).map_or("", |n| n.name()));
    for id in tree.walk() {
        let Some(node) = tree.get(id) else {
            continue;
        };
        let indent = "  ".repeat(tree.depth(id) + 1);
        let name = match &node.kind {
            NodeKind::Code(code) => code.display_name(),
            NodeKind::Group(group) => format!("{}/", group.name),
        };
        let badges = node.badges().to_string();
        if badges.is_empty() {
            out.push_str(&format!("{indent}{name}\n"));
        } else {
            out.push_str(&format!("{indent}{name} {badges}\n"));
        }
    }
    out
}

/// `A+B`, `A B` and `A,B` all work. A lone `+`/`-` is a button name.
fn split_buttons(line: &str) -> Vec<String> {
    line.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .flat_map(|token| {
            if token == "+" || token == "-" {
                vec![token.to_string()]
            } else {
                token
                    .split('+')
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            }
        })
        .collect()
}

/// Prompts over any line reader/writer pair. End of input cancels; so does
/// `q` at a menu.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }

    /// `None` once the output is closed; callers cancel the same way as on EOF.
    fn say(&mut self, text: &str) -> Option<()> {
        writeln!(self.output, "{text}").ok()
    }

    /// Ask for a 1-based menu choice. Returns the index and any trailing text.
    fn choose(&mut self, count: usize) -> Option<(usize, String)> {
        loop {
            self.say(statics::EN_PROMPT_CHOICE)?;
            let line = self.read_line()?;
            let line = line.trim();
            if line.eq_ignore_ascii_case("q") {
                return None;
            }
            let digits: String = line.chars().take_while(char::is_ascii_digit).collect();
            let rest = line[digits.len()..].trim().to_string();
            match digits.parse::<usize>() {
                Ok(n) if (1..=count).contains(&n) => return Some((n - 1, rest)),
                _ => self.say(&format!("{}: {line}", statics::EN_ERR_FORMAT))?,
            }
        }
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn pick_row(&mut self, request: &GridRequest<'_>) -> Option<GridChoice> {
        self.say(&format!("[{}]", request.tag))?;
        self.say(&format!("    {}", request.table.headers.join(" | ")))?;
        for (i, row) in request.table.rows.iter().enumerate() {
            self.say(&format!("{:>3} {}", i + 1, row.join(" | ")))?;
        }
        self.say(&format!(
            "{} ({}): add 's' to toggle",
            statics::EN_LABEL_SWAP_BYTES,
            if request.swap_default { "on" } else { "off" }
        ))?;
        let (row, rest) = self.choose(request.table.rows.len())?;
        let toggle = rest.eq_ignore_ascii_case("s");
        Some(GridChoice {
            row,
            swap_bytes: request.swap_default != toggle,
        })
    }

    fn pick_item(&mut self, request: &ListRequest<'_>) -> Option<usize> {
        self.say(&format!("[{}]", request.tag))?;
        for (i, (value, name)) in request.definition.entries.iter().enumerate() {
            self.say(&format!("{:>3} {name} ({value})", i + 1))?;
        }
        self.choose(request.definition.entries.len()).map(|(i, _)| i)
    }

    fn enter_value(&mut self, request: &ValueRequest<'_>) -> Option<String> {
        if let Some(err) = request.error {
            let kind = if err.is_range() {
                statics::EN_ERR_RANGE
            } else {
                statics::EN_ERR_FORMAT
            };
            self.say(&format!("{kind}: {err}"))?;
        }
        self.say(&format!("{} ({})", request.title, request.description))?;
        self.say(&format!("{} {}", statics::EN_LABEL_DEFAULT, request.current))?;
        let line = self.read_line()?;
        if line.trim().is_empty() {
            Some(request.current.to_string())
        } else {
            Some(line)
        }
    }

    fn pick_platform(&mut self) -> Option<JokerPlatform> {
        const PLATFORMS: [(JokerPlatform, &str); 4] = [
            (JokerPlatform::Ps2, "PS2"),
            (JokerPlatform::GameCube, "GameCube"),
            (JokerPlatform::Wii, "Wii"),
            (JokerPlatform::Gba, "GBA"),
        ];
        self.say(statics::EN_PROMPT_PLATFORM)?;
        for (i, (_, name)) in PLATFORMS.iter().enumerate() {
            self.say(&format!("{:>3} {name}", i + 1))?;
        }
        self.choose(PLATFORMS.len()).map(|(i, _)| PLATFORMS[i].0)
    }

    fn pick_buttons(&mut self, request: &JokerRequest<'_>) -> Option<Vec<String>> {
        if let Some(err) = request.error {
            self.say(&err.to_string())?;
        }
        self.say(&format!(
            "{:?}: {}",
            request.controller,
            request.controller.buttons().join(" ")
        ))?;
        self.say(statics::EN_PROMPT_BUTTONS)?;
        let line = self.read_line()?;
        Some(split_buttons(&line))
    }

    fn notify(&mut self, message: &str) {
        self.say(message);
    }
}

/// Run the CMP Codes CLI
pub fn run_cli() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    cli.command.execute()?;

    Ok(())
}
