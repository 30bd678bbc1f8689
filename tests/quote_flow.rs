use quotebot::app::respond;
use quotebot::setup::config::{Datasource, QuoteConfig};
use quotebot::ConfigError;
use std::fs;
use tempfile::TempDir;

fn config(temp: &TempDir, datasource: Datasource) -> QuoteConfig {
    QuoteConfig {
        datasource,
        data_dir: temp.path().to_path_buf(),
        ..QuoteConfig::default()
    }
}

fn say(config: &QuoteConfig, raw: &str) -> String {
    respond(config, Some("#quotes"), Some(raw)).unwrap()
}

#[test]
fn file_store_walkthrough() {
    let temp = TempDir::new().unwrap();
    let config = config(&temp, Datasource::File);

    assert_eq!(say(&config, "add hello world"), "quote added: hello world.");
    assert_eq!(say(&config, ""), "[0] hello world");
    assert_eq!(say(&config, "remove 0"), "deleted quote #0.");
    assert_eq!(say(&config, ""), "empty file.");
}

#[test]
fn sqlite_store_walkthrough() {
    let temp = TempDir::new().unwrap();
    let config = config(&temp, Datasource::Sqlite);

    assert_eq!(say(&config, "add hello world"), "quote added: hello world.");
    assert_eq!(say(&config, ""), "[1] hello world");
    assert_eq!(say(&config, "delete 1"), "deleted quote #1.");
    assert_eq!(say(&config, ""), "there are no quotes in the database.");
}

#[test]
fn remove_then_show_diverges_between_stores() {
    let temp = TempDir::new().unwrap();
    let file = config(&temp, Datasource::File);
    let sqlite = config(&temp, Datasource::Sqlite);

    for config in [&file, &sqlite] {
        say(config, "add first");
        say(config, "add second");
        say(config, "add third");
    }

    // Positions shift down in the file store
    assert_eq!(say(&file, "remove 1"), "deleted quote #1.");
    assert_eq!(say(&file, "show 1"), "[1] third");

    // Row ids stay put in the database
    assert_eq!(say(&sqlite, "remove 2"), "deleted quote #2.");
    assert_eq!(
        say(&sqlite, "show 2"),
        "there was no quote in the database with id = 2."
    );
    assert_eq!(say(&sqlite, "show 3"), "[3] third");
}

#[test]
fn out_of_range_and_missing_ids() {
    let temp = TempDir::new().unwrap();
    let file = config(&temp, Datasource::File);
    let sqlite = config(&temp, Datasource::Sqlite);

    assert_eq!(
        say(&file, "show 0"),
        "command argument exceeds number of lines in file"
    );
    assert_eq!(
        say(&file, "delete 5"),
        "command argument exceeds number of lines in file"
    );
    // Deleting a missing row still reports success
    assert_eq!(say(&sqlite, "delete 5"), "deleted quote #5.");
}

#[test]
fn validation_happens_before_the_store() {
    let temp = TempDir::new().unwrap();
    let config = config(&temp, Datasource::File);

    for subcommand in ["show", "remove", "delete"] {
        assert_eq!(
            say(&config, &format!("{subcommand} -1")),
            "command argument must be non-negative: -1"
        );
        assert_eq!(
            say(&config, &format!("{subcommand} abc")),
            "command argument must be valid integer: abc"
        );
    }
    assert_eq!(say(&config, "rename 1"), "invalid subcommand: rename");
    assert_eq!(say(&config, "add"), "invalid number of arguments");
}

#[test]
fn search_and_find_both_stores() {
    let temp = TempDir::new().unwrap();
    for datasource in [Datasource::File, Datasource::Sqlite] {
        let config = config(&temp, datasource);
        say(&config, "add The quick brown fox");
        say(&config, "add lazy dog");

        assert!(say(&config, "search QUICK").ends_with("] The quick brown fox"));
        assert!(say(&config, "find dog").ends_with("] lazy dog"));
    }

    assert_eq!(
        say(&config(&temp, Datasource::File), "search cat"),
        "no matches found for search phrase: cat"
    );
    assert_eq!(
        say(&config(&temp, Datasource::Sqlite), "search cat"),
        "there are no quotes in the database that match pattern = cat."
    );
}

#[test]
fn channels_get_separate_stores_unless_onefile() {
    let temp = TempDir::new().unwrap();
    let split = config(&temp, Datasource::File);

    respond(&split, Some("#one"), Some("add only in one")).unwrap();
    assert_eq!(
        respond(&split, Some("#two"), None).unwrap(),
        "empty file."
    );
    assert!(temp.path().join("quotes_one.txt").is_file());
    assert!(temp.path().join("quotes_two.txt").is_file());

    let shared = QuoteConfig {
        onefile: true,
        ..split
    };
    respond(&shared, Some("#one"), Some("add shared")).unwrap();
    assert_eq!(
        respond(&shared, Some("#two"), None).unwrap(),
        "[0] shared"
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("quotes.txt")).unwrap(),
        "shared\n"
    );
}

#[test]
fn both_stores_create_a_missing_data_dir() {
    let temp = TempDir::new().unwrap();
    for datasource in [Datasource::File, Datasource::Sqlite] {
        let config = QuoteConfig {
            datasource,
            data_dir: temp.path().join("nested").join("deeper"),
            ..QuoteConfig::default()
        };

        assert_eq!(say(&config, "add x"), "quote added: x.");
    }
    assert!(temp.path().join("nested/deeper/quotes_quotes.txt").is_file());
    assert!(temp.path().join("nested/deeper/quotes_quotes.db").is_file());
}

#[test]
fn oversized_ids_are_misses_not_parse_errors() {
    let temp = TempDir::new().unwrap();
    let file = config(&temp, Datasource::File);
    let sqlite = config(&temp, Datasource::Sqlite);

    assert_eq!(
        say(&file, "show 99999999999999999999"),
        "command argument exceeds number of lines in file"
    );
    assert_eq!(
        say(&sqlite, "show 99999999999999999999"),
        format!("there was no quote in the database with id = {}.", u64::MAX)
    );
    assert_eq!(
        say(&file, "show -99999999999999999999"),
        "command argument must be non-negative: -99999999999999999999"
    );
}

#[test]
fn missing_channel_is_a_config_error() {
    let temp = TempDir::new().unwrap();
    let config = config(&temp, Datasource::Sqlite);

    assert!(matches!(
        respond(&config, None, None),
        Err(ConfigError::Missing("channel"))
    ));
}

#[test]
fn unopenable_store_is_reported_as_reply() {
    let temp = TempDir::new().unwrap();
    // A directory where the quote file should be
    fs::create_dir(temp.path().join("quotes_quotes.txt")).unwrap();
    let config = config(&temp, Datasource::File);

    let reply = say(&config, "");
    assert!(reply.starts_with("failed creating quote file"), "{reply}");
}
