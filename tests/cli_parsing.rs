use clap::Parser;
use zero_coach::cli::commands::attempt::AttemptCommands;
use zero_coach::cli::commands::leniency::LeniencyCommands;
use zero_coach::cli::commands::lock::LockCommands;
use zero_coach::cli::commands::override_cmd::Switch;
use zero_coach::cli::{Cli, Commands};

#[test]
fn test_parse_recommend_with_window() {
    let cli = Cli::try_parse_from(["zero-coach", "recommend", "--last", "50", "--leniency", "1.5"]).unwrap();

    match cli.command {
        Commands::Recommend(args) => {
            assert_eq!(args.window.last, Some(50));
            assert_eq!(args.window.leniency, Some(1.5));
            assert!(!args.window.all);
        }
        _ => panic!("Wrong top-level command"),
    }
    assert!(!cli.json);
}

#[test]
fn test_window_flags_conflict() {
    assert!(Cli::try_parse_from(["zero-coach", "recommend", "--last", "5", "--all"]).is_err());
    assert!(Cli::try_parse_from(["zero-coach", "recommend", "--all", "--since", "2026-01-01T00:00:00Z"]).is_err());
}

#[test]
fn test_parse_global_json_after_subcommand() {
    let cli = Cli::try_parse_from(["zero-coach", "skip", "--json"]).unwrap();
    assert!(cli.json);
    assert!(matches!(cli.command, Commands::Skip));
}

#[test]
fn test_parse_lock_toggle_on() {
    let cli = Cli::try_parse_from(["zero-coach", "lock", "toggle", "tower|T-100|Back|CW", "--on"]).unwrap();

    match cli.command {
        Commands::Lock(args) => match args.command {
            LockCommands::Toggle { key, on, off } => {
                assert_eq!(key, "tower|T-100|Back|CW");
                assert!(on);
                assert!(!off);
            }
            _ => panic!("Wrong lock command"),
        },
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_lock_toggle_on_and_off_conflict() {
    assert!(Cli::try_parse_from(["zero-coach", "lock", "toggle", "mpk|M-85|Front|3", "--on", "--off"]).is_err());
}

#[test]
fn test_parse_override_switch() {
    let cli = Cli::try_parse_from(["zero-coach", "override", "on"]).unwrap();
    match cli.command {
        Commands::Override(args) => assert!(matches!(args.state, Switch::On)),
        _ => panic!("Wrong top-level command"),
    }
    assert!(Cli::try_parse_from(["zero-coach", "override", "maybe"]).is_err());
}

#[test]
fn test_parse_leniency_set() {
    let cli = Cli::try_parse_from(["zero-coach", "leniency", "set", "0.75"]).unwrap();
    match cli.command {
        Commands::Leniency(args) => match args.command {
            LeniencyCommands::Set { value } => assert!((value - 0.75).abs() < f64::EPSILON),
            LeniencyCommands::Clear => panic!("Wrong leniency command"),
        },
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_attempt_record_with_negative_seed() {
    let cli = Cli::try_parse_from([
        "zero-coach",
        "attempt",
        "record",
        "mpk|M-85|Front|3",
        "success",
        "--standing-height",
        "2",
        "--seed",
        "-42",
    ])
    .unwrap();

    match cli.command {
        Commands::Attempt(args) => match args.command {
            AttemptCommands::Record { key, outcome, standing_height, seed, full_random } => {
                assert_eq!(key, "mpk|M-85|Front|3");
                assert_eq!(outcome, "success");
                assert_eq!(standing_height, Some(2));
                assert_eq!(seed, Some(-42));
                assert!(!full_random);
            }
            AttemptCommands::List { .. } => panic!("Wrong attempt command"),
        },
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_watch_defaults() {
    let cli = Cli::try_parse_from(["zero-coach", "watch"]).unwrap();
    match cli.command {
        Commands::Watch(args) => {
            assert_eq!(args.interval_ms, 1000);
            assert!(args.max_polls.is_none());
            assert!(!args.verbose);
        }
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_init_path_and_config_flag() {
    let cli = Cli::try_parse_from(["zero-coach", "--config", "custom.yaml", "init", "--force", "practice"]).unwrap();
    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("custom.yaml")));
    match cli.command {
        Commands::Init(args) => {
            assert!(args.force);
            assert_eq!(args.path, std::path::PathBuf::from("practice"));
        }
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_unknown_command_fails() {
    assert!(Cli::try_parse_from(["zero-coach", "swarm"]).is_err());
}
