use pretty_assertions::assert_eq;
use std::collections::VecDeque;

use cmpcodes::resolver::{GridChoice, GridRequest, JokerRequest, ListRequest, ValueRequest};
use cmpcodes::{
    CodeDatabase, CodeNode, JokerPlatform, NodeId, Outcome, Prompter, Resolver, Settings,
};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

enum Answer {
    Row(usize, bool),
    Item(usize),
    Value(&'static str),
    Platform(JokerPlatform),
    Buttons(&'static [&'static str]),
}

/// Replays canned answers in order and records what it was asked.
#[derive(Default)]
struct Scripted {
    answers: VecDeque<Answer>,
    asked: Vec<String>,
    notices: Vec<String>,
}

impl Scripted {
    fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Default::default()
        }
    }
}

impl Prompter for Scripted {
    fn pick_row(&mut self, request: &GridRequest<'_>) -> Option<GridChoice> {
        self.asked.push(format!("row:{}:{}", request.tag, request.swap_default));
        match self.answers.pop_front()? {
            Answer::Row(row, swap_bytes) => Some(GridChoice { row, swap_bytes }),
            _ => None,
        }
    }

    fn pick_item(&mut self, request: &ListRequest<'_>) -> Option<usize> {
        self.asked.push(format!("item:{}", request.tag));
        match self.answers.pop_front()? {
            Answer::Item(i) => Some(i),
            _ => None,
        }
    }

    fn enter_value(&mut self, request: &ValueRequest<'_>) -> Option<String> {
        let error = match request.error {
            Some(e) if e.is_range() => "range",
            Some(_) => "format",
            None => "none",
        };
        self.asked
            .push(format!("value:{}:{}:{error}", request.title, request.current));
        match self.answers.pop_front()? {
            Answer::Value(v) => Some(v.to_string()),
            _ => None,
        }
    }

    fn pick_platform(&mut self) -> Option<JokerPlatform> {
        self.asked.push("platform".to_string());
        match self.answers.pop_front()? {
            Answer::Platform(p) => Some(p),
            _ => None,
        }
    }

    fn pick_buttons(&mut self, request: &JokerRequest<'_>) -> Option<Vec<String>> {
        self.asked.push(format!("buttons:{:?}", request.controller));
        match self.answers.pop_front()? {
            Answer::Buttons(b) => Some(b.iter().map(|s| s.to_string()).collect()),
            _ => None,
        }
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}

const ATK_FILE: &str = "\
!Battle
+Attack
$20000000 [ATK]
!!
^6 = MODS:
[ATK]
Value>Name
00000001=Small
0000000A=Medium
[/ATK]
";

fn db(text: &str) -> CodeDatabase {
    CodeDatabase::parse_str(text, &Settings::default())
}

fn code<'a>(db: &'a CodeDatabase, path: &str) -> &'a CodeNode {
    let id = db.find_code(path).expect("code exists");
    db.code(id).expect("is a code")
}

fn id(db: &CodeDatabase, path: &str) -> NodeId {
    db.find_code(path).expect("code exists")
}

#[test]
fn picking_a_grid_row_substitutes_its_value() -> Result<()> {
    let mut db = db(ATK_FILE);
    let attack = id(&db, "Battle/Attack");
    assert!(db.tree.badges(attack).has_mod);

    let mut prompter = Scripted::new([Answer::Row(1, false)]);
    let report = db.resolve(attack, 0, &Settings::default(), &mut prompter)?;

    assert_eq!(report.outcome, Outcome::Completed);
    assert_eq!(report.substitutions, 1);
    let node = code(&db, "Battle/Attack");
    assert_eq!(node.working_text, "20000000 0000000A");
    assert_eq!(node.applied_labels.values().collect::<Vec<_>>(), vec!["Medium"]);
    assert_eq!(node.display_name(), "Attack [Medium]");
    assert!(!db.tree.badges(attack).has_mod);
    let battle = db.tree.parent(attack).expect("has parent");
    assert!(!db.tree.badges(battle).has_mod);
    Ok(())
}

#[test]
fn swap_hint_sets_default_and_swaps_bytes() -> Result<()> {
    let text = ATK_FILE.replace("[ATK]\n!!", "[ATK<*Power>]\n!!");
    let mut db = db(&text);
    let attack = id(&db, "Battle/Attack");

    let mut prompter = Scripted::new([Answer::Row(0, true)]);
    db.resolve(attack, 0, &Settings::default(), &mut prompter)?;

    assert_eq!(prompter.asked, vec!["row:ATK<*Power>:true"]);
    let node = code(&db, "Battle/Attack");
    assert_eq!(node.working_text, "20000000 01000000");
    assert_eq!(node.display_name(), "Attack [Power: Small]");
    Ok(())
}

#[test]
fn amount_tag_is_unresolved_until_filled() -> Result<()> {
    let mut db = db("+Money\n$20000000 [Amount:05F5E0FF:HEX:BIG]\n");
    let money = id(&db, "Money");
    assert_eq!(db.unresolved_codes(), vec![money]);

    let mut prompter = Scripted::new([Answer::Value("0x0001E240")]);
    let report = db.resolve(money, 0, &Settings::default(), &mut prompter)?;

    assert_eq!(report.outcome, Outcome::Completed);
    assert_eq!(code(&db, "Money").working_text, "20000000 0001E240");
    assert!(db.unresolved_codes().is_empty());
    assert_eq!(prompter.asked, vec!["value:Amount:99999999:none"]);
    Ok(())
}

#[test]
fn range_error_reverts_and_reprompts() -> Result<()> {
    let mut db = db("+HP\n$10000000 [Amount:9999:DEC:BIG<HP>]\n");
    let hp = id(&db, "HP");

    let mut prompter = Scripted::new([
        Answer::Value("70000"),
        Answer::Value("lots"),
        Answer::Value("500"),
    ]);
    db.resolve(hp, 0, &Settings::default(), &mut prompter)?;

    assert_eq!(
        prompter.asked,
        vec![
            "value:HP:9999:none",
            "value:HP:9999:range",
            "value:HP:lots:format",
        ]
    );
    let node = code(&db, "HP");
    assert_eq!(node.working_text, "10000000 01F4");
    assert_eq!(node.display_name(), "HP [HP: 500]");
    Ok(())
}

#[test]
fn same_title_keeps_one_label() -> Result<()> {
    let text = "\
+Max HP
$20000000 [HPMOD<HP>]
$20000004 [Amount:0000270F:DEC:BIG<HP>]
^6 = MODS:
[HPMOD]
0000FFFF=Max
[/HPMOD]
";
    let mut db = db(text);
    let max_hp = id(&db, "Max HP");

    let mut prompter = Scripted::new([Answer::Item(0), Answer::Value("9999")]);
    db.resolve(max_hp, 0, &Settings::default(), &mut prompter)?;

    let node = code(&db, "Max HP");
    assert_eq!(node.working_text, "20000000 0000FFFF\n20000004 0000270F");
    assert_eq!(node.applied_labels.len(), 1);
    assert_eq!(node.display_name(), "Max HP [HP: 9999]");
    Ok(())
}

#[test]
fn cancel_keeps_earlier_substitutions() -> Result<()> {
    let mut db = db("+Two\n$[Amount:0000:HEX:BIG] [Amount:0000:HEX:BIG]\n");
    let two = id(&db, "Two");

    let mut prompter = Scripted::new([Answer::Value("BEEF")]);
    let report = db.resolve(two, 0, &Settings::default(), &mut prompter)?;

    assert_eq!(report.outcome, Outcome::Cancelled);
    assert_eq!(report.substitutions, 1);
    assert_eq!(code(&db, "Two").working_text, "BEEF [Amount:0000:HEX:BIG]");
    assert!(db.tree.badges(two).has_mod);
    Ok(())
}

#[test]
fn resolution_starts_at_cursor_and_wraps() -> Result<()> {
    let mut db = db("+Two\n$[Amount:00:HEX:BIG<A>] [Amount:00:HEX:BIG<B>]\n");
    let two = id(&db, "Two");

    // Cursor inside the second tag.
    let mut prompter = Scripted::new([Answer::Value("0x22"), Answer::Value("0x11")]);
    let report = db.resolve(two, 30, &Settings::default(), &mut prompter)?;

    assert_eq!(report.outcome, Outcome::Completed);
    assert_eq!(code(&db, "Two").working_text, "11 22");
    assert_eq!(code(&db, "Two").display_name(), "Two [B: 0x22, A: 0x11]");
    Ok(())
}

#[test]
fn unknown_tag_aborts_after_earlier_work() -> Result<()> {
    let mut db = db("+Mixed\n$[Amount:00:HEX:BIG] [SOMETHING]\n");
    let mixed = id(&db, "Mixed");

    let mut prompter = Scripted::new([Answer::Value("7F")]);
    let report = db.resolve(mixed, 0, &Settings::default(), &mut prompter)?;

    assert_eq!(report.outcome, Outcome::UnknownTag("SOMETHING".to_string()));
    assert_eq!(code(&db, "Mixed").working_text, "7F [SOMETHING]");
    assert_eq!(prompter.notices, vec!["Unknown tag: [SOMETHING]"]);
    // Bare tokens never block copying.
    assert!(!db.tree.badges(mixed).has_mod);
    Ok(())
}

#[test]
fn joker_all_asks_for_platform() -> Result<()> {
    let mut db = db("+Joker\n$D0000000 [Joker:ALL]\n");
    let joker = id(&db, "Joker");

    let mut prompter = Scripted::new([
        Answer::Platform(JokerPlatform::Ps2),
        Answer::Buttons(&["Jump"]),
        Answer::Buttons(&["select", "start"]),
    ]);
    db.resolve(joker, 0, &Settings::default(), &mut prompter)?;

    assert_eq!(
        prompter.asked,
        vec!["platform", "buttons:Ps2", "buttons:Ps2"]
    );
    let node = code(&db, "Joker");
    assert_eq!(node.working_text, "D0000000 0009");
    assert_eq!(node.display_name(), "Joker [Joker: Press Select+Start]");
    Ok(())
}

#[test]
fn joker_mods_pick_layout_and_byte_order() -> Result<()> {
    let mut db = db("+GC\n$[Joker:GC:LE]\n+Classic\n$[Joker:Wii:CC]\n");
    let gc = id(&db, "GC");
    let classic = id(&db, "Classic");

    let mut prompter = Scripted::new([
        Answer::Buttons(&["Start"]),
        Answer::Buttons(&["A"]),
    ]);
    db.resolve(gc, 0, &Settings::default(), &mut prompter)?;
    db.resolve(classic, 0, &Settings::default(), &mut prompter)?;

    assert_eq!(prompter.asked, vec!["buttons:GameCube", "buttons:Classic"]);
    assert_eq!(code(&db, "GC").working_text, "0010");
    assert_eq!(code(&db, "Classic").working_text, "0010");
    Ok(())
}

#[test]
fn text_amount_pads_to_budget() -> Result<()> {
    let mut db = db("+Name\n$[Amount:99999999:UTF8:TXT<Name>]\n");
    let name = id(&db, "Name");

    let mut prompter = Scripted::new([Answer::Value("TooLongName"), Answer::Value("Hero")]);
    db.resolve(name, 0, &Settings::default(), &mut prompter)?;

    assert_eq!(code(&db, "Name").working_text, "4865726F00000000");
    assert_eq!(code(&db, "Name").display_name(), "Name [Name: Hero]");
    Ok(())
}

#[test]
fn star_renders_padded_digits() -> Result<()> {
    let mut db = db("+Stars\n$[STAR] [STAR:D3B]\n");
    let stars = id(&db, "Stars");

    let mut prompter = Scripted::new([Answer::Value("255"), Answer::Value("5")]);
    db.resolve(stars, 0, &Settings::default(), &mut prompter)?;

    assert_eq!(code(&db, "Stars").working_text, "00FF 031");
    Ok(())
}

#[test]
fn resolver_works_on_a_detached_node() {
    let parsed = cmpcodes::parser::parse_str(
        "+Solo\n$[Amount:00000000:FLOAT:BIG]\n",
        &Settings::default(),
    );
    let id = parsed.tree.codes().next().expect("one code");
    let mut node = parsed.tree.code(id).expect("code").clone();
    let settings = Settings::default();
    let mut prompter = Scripted::new([Answer::Value("1.5")]);

    let report = Resolver::new(&parsed.mods, &settings, &mut prompter).resolve_all(&mut node);

    assert_eq!(report.outcome, Outcome::Completed);
    assert_eq!(node.working_text, "3FC00000");
    assert_eq!(node.raw_template(), "[Amount:00000000:FLOAT:BIG]");
}
