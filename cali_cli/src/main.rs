use cali_core::*;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cali")]
#[command(about = "Calisthenics skill tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the exercise catalog
    List {
        /// Restrict to a category (push, pull, elite)
        #[arg(long)]
        category: Option<String>,
    },

    /// Record a session non-interactively
    Log {
        /// Exercise id (e.g. push-1, elite-3)
        exercise_id: String,

        /// Roadmap level being trained (Elite exercises)
        #[arg(long)]
        level: Option<u32>,

        /// Logged set as REPS or REPS@WEIGHT_OR_TIME (repeatable)
        #[arg(long = "set", value_name = "SET")]
        sets: Vec<String>,
    },

    /// Run an interactive logging session
    Session {
        /// Exercise id (e.g. push-1, elite-3)
        exercise_id: String,

        /// Roadmap level being trained (Elite exercises)
        #[arg(long)]
        level: Option<u32>,
    },

    /// Discard an in-flight session left by an interrupted run
    Cancel,

    /// Show recorded sessions for an exercise, newest first
    History {
        /// Exercise id
        exercise_id: String,

        /// Show at most this many sessions
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show dashboard statistics
    Stats,

    /// Show an Elite skill roadmap with current progress
    Roadmap {
        /// Exercise id of an Elite skill
        exercise_id: String,
    },

    /// Manually set or reset skill progress
    Progress {
        /// Exercise id of an Elite skill
        exercise_id: String,

        /// Set the current level (the sentinel roadmap_len + 1 means mastered)
        #[arg(long, conflicts_with = "reset")]
        level: Option<u32>,

        /// Remove stored progress, reverting to level 1
        #[arg(long, conflicts_with = "level")]
        reset: bool,
    },

    /// Export session history to CSV
    Export {
        /// Output path (defaults to <data-dir>/<csv_name from config>)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    cali_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Commands::List { category } => cmd_list(data_dir, category),
        Commands::Log {
            exercise_id,
            level,
            sets,
        } => cmd_log(data_dir, &exercise_id, level, &sets),
        Commands::Session { exercise_id, level } => cmd_session(data_dir, &exercise_id, level),
        Commands::Cancel => cmd_cancel(data_dir),
        Commands::History { exercise_id, limit } => cmd_history(data_dir, &exercise_id, limit),
        Commands::Stats => cmd_stats(data_dir),
        Commands::Roadmap { exercise_id } => cmd_roadmap(data_dir, &exercise_id),
        Commands::Progress {
            exercise_id,
            level,
            reset,
        } => cmd_progress(data_dir, &exercise_id, level, reset),
        Commands::Export { output } => cmd_export(data_dir, output, &config),
    }
}

/// Open the store backed by <data-dir>/state.json, validating the catalog
fn open_store(data_dir: &PathBuf) -> Result<WorkoutStore> {
    std::fs::create_dir_all(data_dir)?;

    let catalog = build_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }

    WorkoutStore::open(catalog, data_dir.join("state.json"))
}

fn parse_category(s: &str) -> Option<Category> {
    match s.to_lowercase().as_str() {
        "push" => Some(Category::Push),
        "pull" => Some(Category::Pull),
        "elite" => Some(Category::Elite),
        _ => {
            eprintln!("Unknown category: {}. Expected push, pull, or elite.", s);
            None
        }
    }
}

/// Parse a set argument of the form REPS or REPS@WEIGHT_OR_TIME
fn parse_set_arg(arg: &str) -> SetEntry {
    match arg.split_once('@') {
        Some((reps, weight_or_time)) => SetEntry::new(reps, weight_or_time),
        None => SetEntry::new(arg, ""),
    }
}

fn require_exercise<'a>(store: &'a WorkoutStore, exercise_id: &str) -> Result<&'a Exercise> {
    store
        .catalog()
        .find(exercise_id)
        .ok_or_else(|| Error::Other(format!("Unknown exercise id: {}", exercise_id)))
}

fn cmd_list(data_dir: PathBuf, category: Option<String>) -> Result<()> {
    let store = open_store(&data_dir)?;

    let categories: Vec<Category> = match category.as_deref() {
        Some(s) => match parse_category(s) {
            Some(c) => vec![c],
            None => return Ok(()),
        },
        None => vec![Category::Push, Category::Pull, Category::Elite],
    };

    for category in categories {
        println!("\n{}", category.label().to_uppercase());
        println!("─────────────────────────────────────────");
        for (index, exercise) in store.catalog().by_category(category).iter().enumerate() {
            let marker = if category == Category::Elite {
                let level = store.skill_level(&exercise.id);
                if level > exercise.roadmap_len() {
                    "  [mastered]".to_string()
                } else {
                    format!("  [level {}/{}]", level, exercise.roadmap_len())
                }
            } else {
                String::new()
            };
            println!(
                "  {:02}  {:<28} {}{}",
                index + 1,
                exercise.name,
                exercise.id,
                marker
            );
        }
    }
    println!();

    Ok(())
}

fn cmd_log(
    data_dir: PathBuf,
    exercise_id: &str,
    level: Option<u32>,
    set_args: &[String],
) -> Result<()> {
    let mut store = open_store(&data_dir)?;
    require_exercise(&store, exercise_id)?;

    let level_before = store.skill_level(exercise_id);

    store.start_session(exercise_id, level)?;
    for arg in set_args {
        store.add_set(parse_set_arg(arg));
    }

    // Just started, so a session is guaranteed to be active here
    let session = store
        .finish_session()
        .ok_or_else(|| Error::Other("No active session to finish".into()))?;

    display_recorded(&store, &session, level_before);
    Ok(())
}

fn cmd_session(data_dir: PathBuf, exercise_id: &str, level: Option<u32>) -> Result<()> {
    let mut store = open_store(&data_dir)?;
    let exercise = require_exercise(&store, exercise_id)?;

    let heading = match level.and_then(|l| exercise.roadmap_step(l)) {
        Some(step) => format!("{}: {}", exercise.name, step.name),
        None => exercise.name.clone(),
    };
    let goal = level.and_then(|l| exercise.roadmap_step(l)).map(|s| s.goal.clone());

    let level_before = store.skill_level(exercise_id);
    store.start_session(exercise_id, level)?;

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  ACTIVE SESSION");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", heading);
    if let Some(goal) = goal {
        println!("  Goal: {}", goal);
    }
    if let Some(last) = store.state().sessions_for(exercise_id).first() {
        let reps: Vec<&str> = last.sets.iter().map(|s| s.reps.as_str()).collect();
        println!("  Last: {}", reps.join(", "));
    }
    println!();

    loop {
        let elapsed = store
            .state()
            .session_started_at
            .map(|at| (chrono::Utc::now() - at).num_seconds().max(0))
            .unwrap_or(0);

        println!("─────────────────────────────────────────");
        println!("[{}] Enter a set as REPS or REPS@WEIGHT_OR_TIME", format_elapsed(elapsed));
        println!("  'd N' + Enter to delete set N");
        println!("  'f' + Enter to finish, 'c' + Enter to cancel");
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();

        match input {
            "" => continue,
            "f" | "F" => {
                if let Some(session) = store.finish_session() {
                    display_recorded(&store, &session, level_before);
                }
                return Ok(());
            }
            "c" | "C" => {
                store.cancel_session();
                println!("\nSession cancelled - nothing recorded.");
                return Ok(());
            }
            _ => {
                if let Some(rest) = input.strip_prefix("d ") {
                    match rest.trim().parse::<usize>() {
                        Ok(n) if n >= 1 => store.remove_set(n - 1),
                        _ => eprintln!("Expected a set number, e.g. 'd 2'"),
                    }
                } else {
                    store.add_set(parse_set_arg(input));
                }

                for (i, set) in store.state().current_sets.iter().enumerate() {
                    let suffix = if set.weight_or_time.is_empty() {
                        String::new()
                    } else {
                        format!("  ({})", set.weight_or_time)
                    };
                    println!("  {}. {} reps{}", i + 1, set.reps, suffix);
                }
            }
        }
    }
}

fn cmd_cancel(data_dir: PathBuf) -> Result<()> {
    let mut store = open_store(&data_dir)?;

    match store.state().active_exercise_id.clone() {
        Some(exercise_id) => {
            store.cancel_session();
            println!("Discarded in-flight session for {}.", exercise_id);
        }
        None => println!("No active session."),
    }

    Ok(())
}

fn cmd_history(data_dir: PathBuf, exercise_id: &str, limit: Option<usize>) -> Result<()> {
    let store = open_store(&data_dir)?;
    let exercise = require_exercise(&store, exercise_id)?;

    let sessions = store.state().sessions_for(exercise_id);
    if sessions.is_empty() {
        println!("No sessions recorded for {} yet.", exercise.name);
        return Ok(());
    }

    println!("\n{} - {} sessions", exercise.name, sessions.len());
    println!("─────────────────────────────────────────");
    let shown = limit.unwrap_or(sessions.len());
    for session in sessions.iter().take(shown) {
        let sets: Vec<String> = session
            .sets
            .iter()
            .map(|s| {
                if s.weight_or_time.is_empty() {
                    s.reps.clone()
                } else {
                    format!("{}@{}", s.reps, s.weight_or_time)
                }
            })
            .collect();
        println!(
            "  {}  {:>4}s  [{}]",
            session.recorded_at.format("%Y-%m-%d %H:%M"),
            session.duration_seconds,
            sets.join(", ")
        );
    }
    println!();

    Ok(())
}

fn cmd_stats(data_dir: PathBuf) -> Result<()> {
    let store = open_store(&data_dir)?;
    let now = chrono::Utc::now();

    let push = category_stats(store.state(), store.catalog(), Category::Push, now);
    let pull = category_stats(store.state(), store.catalog(), Category::Pull, now);
    let elite = elite_stats(store.state(), store.catalog());

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  DASHBOARD");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Total sessions: {}", push.total + pull.total);
    println!();
    println!(
        "  Push   level {:<2}  {} sessions this week ({} total)",
        push.level, push.last_7_days, push.total
    );
    println!(
        "  Pull   level {:<2}  {} sessions this week ({} total)",
        pull.level, pull.last_7_days, pull.total
    );
    println!();
    println!(
        "  Elite skills: {}% of roadmap levels complete, {} mastered",
        elite.percent, elite.mastered
    );

    if let Some(weak) = weak_point(&push, &pull) {
        println!();
        println!("  Weak point this week: {}", weak.label());
    }
    println!();

    Ok(())
}

fn cmd_roadmap(data_dir: PathBuf, exercise_id: &str) -> Result<()> {
    let store = open_store(&data_dir)?;
    let exercise = require_exercise(&store, exercise_id)?;

    let Some(roadmap) = &exercise.roadmap else {
        println!("{} has no skill roadmap.", exercise.name);
        return Ok(());
    };

    let current = store.skill_level(exercise_id);
    println!("\n{} roadmap", exercise.name);
    println!("─────────────────────────────────────────");
    for step in roadmap {
        let marker = if step.level < current {
            "✓"
        } else if step.level == current {
            "→"
        } else {
            " "
        };
        println!("  {} {}. {:<26} {}", marker, step.level, step.name, step.goal);
    }
    if current > exercise.roadmap_len() {
        println!("\n  Mastered!");
    }
    println!();

    Ok(())
}

fn cmd_progress(
    data_dir: PathBuf,
    exercise_id: &str,
    level: Option<u32>,
    reset: bool,
) -> Result<()> {
    let mut store = open_store(&data_dir)?;
    let exercise = require_exercise(&store, exercise_id)?.clone();

    if reset {
        store.reset_skill_progress(exercise_id);
        println!("Progress for {} reset to level 1.", exercise.name);
    } else if let Some(level) = level {
        store.update_skill_progress(exercise_id, level);
        if level > exercise.roadmap_len() {
            println!("{} marked as mastered.", exercise.name);
        } else {
            println!("{} set to level {}.", exercise.name, level);
        }
    } else {
        println!(
            "{} is at level {} of {}.",
            exercise.name,
            store.skill_level(exercise_id),
            exercise.roadmap_len()
        );
    }

    Ok(())
}

fn cmd_export(data_dir: PathBuf, output: Option<PathBuf>, config: &Config) -> Result<()> {
    let store = open_store(&data_dir)?;
    let csv_path = output.unwrap_or_else(|| data_dir.join(&config.export.csv_name));

    let count = export_history(store.state(), store.catalog(), &csv_path)?;

    println!("✓ Exported {} sessions to CSV", count);
    println!("  CSV: {}", csv_path.display());

    Ok(())
}

/// Print a recorded session, including any skill-level change
fn display_recorded(store: &WorkoutStore, session: &Session, level_before: u32) {
    println!("\n✓ Session logged!");
    println!(
        "  {} sets in {}",
        session.sets.len(),
        format_elapsed(session.duration_seconds as i64)
    );

    let level_after = store.skill_level(&session.exercise_id);
    if level_after > level_before {
        let exercise = store.catalog().find(&session.exercise_id);
        let mastered = exercise.is_some_and(|e| level_after > e.roadmap_len());
        if mastered {
            println!("  ★ Skill mastered!");
        } else {
            println!("  ★ Advanced to level {}!", level_after);
        }
    }
}

fn format_elapsed(total_seconds: i64) -> String {
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}
