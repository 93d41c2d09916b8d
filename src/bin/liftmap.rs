//! Command-line front end for liftmap.

use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};
use log::error;

use liftmap::heatmap::legend;
use liftmap::{
    BodyPart, GenerationClient, HeatmapGrid, PromptSession, TrackerConfig, TrackerError, Workout,
    WorkoutStore, load_workout_view,
};

#[derive(Parser, Debug)]
#[command(name = "liftmap", version, about = "Prompt-driven workout log")]
struct Cli {
    /// SQLite database path (defaults to $LIFTMAP_DB or ./liftmap.db)
    #[arg(long, global = true)]
    db: Option<String>,

    /// Planner base URL (defaults to $LIFTMAP_API)
    #[arg(long, global = true)]
    api: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a workout from a goal and record it
    Generate {
        /// Natural-language goal, e.g. "45 minute upper body session"
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },
    /// List stored workouts, newest first
    Workouts {
        /// Only workouts that trained this body part, e.g. "legs" or "full-body"
        #[arg(long)]
        part: Option<BodyPart>,
    },
    /// Show one workout (latest by default) and the year heatmap
    Show { id: Option<String> },
    /// Mark a workout as completed
    Complete {
        id: String,
        /// Clear the completed flag instead
        #[arg(long)]
        undo: bool,
    },
    /// Print the body-part heatmap for the last year
    Heatmap,
    /// Probe the planner's health endpoint
    Health,
}

fn body_part_glyph(part: BodyPart) -> char {
    match part {
        BodyPart::Chest => 'C',
        BodyPart::Back => 'B',
        BodyPart::Shoulders => 'S',
        BodyPart::Arms => 'A',
        BodyPart::Legs => 'L',
        BodyPart::Core => 'O',
        BodyPart::Cardio => 'R',
        BodyPart::FullBody => 'F',
    }
}

fn render_heatmap(grid: &HeatmapGrid) -> String {
    const ROW_NAMES: [&str; 7] = ["   ", "Mon", "   ", "Wed", "   ", "Fri", "   "];

    let mut header = vec![' '; grid.weeks.len()];
    for label in &grid.month_labels {
        for (i, ch) in label.month.chars().enumerate() {
            if let Some(slot) = header.get_mut(label.offset + i) {
                *slot = ch;
            }
        }
    }

    let mut out = format!("    {}\n", header.into_iter().collect::<String>());
    for (row, name) in ROW_NAMES.iter().enumerate() {
        out.push_str(name);
        out.push(' ');
        for week in &grid.weeks {
            let index = row as i64 - week.leading_padding as i64;
            let cell = usize::try_from(index)
                .ok()
                .and_then(|i| week.days.get(i))
                .map(|day| {
                    day.body_parts
                        .first()
                        .map(|p| body_part_glyph(*p))
                        .unwrap_or('.')
                })
                .unwrap_or(' ');
            out.push(cell);
        }
        out.push('\n');
    }

    let key: Vec<String> = legend()
        .into_iter()
        .map(|(part, color)| format!("{}={} ({})", body_part_glyph(part), part, color))
        .collect();
    out.push_str(&format!("\n{}\n", key.join("  ")));
    out.push_str(&format!(
        "{} active days between {} and {}\n",
        grid.active_days(),
        grid.start,
        grid.end
    ));
    out
}

fn print_workout(workout: &Workout) {
    println!("Workout {}", workout.id);
    if let Some(prompt) = &workout.prompt {
        println!("Goal: {}", prompt);
    }
    println!(
        "{}{}",
        workout.date.format("%A, %B %-d, %Y"),
        if workout.completed { " (completed)" } else { "" }
    );
    for exercise in &workout.exercises {
        let summary = exercise.summary();
        if summary.is_empty() {
            println!("  - {} [{}]", exercise.name, exercise.body_part);
        } else {
            println!("  - {} [{}] {}", exercise.name, exercise.body_part, summary);
        }
        if let Some(notes) = &exercise.notes {
            println!("      {}", notes);
        }
    }
    if let Some(notes) = &workout.notes {
        println!("Notes: {}", notes);
    }
}

async fn run(cli: Cli, config: TrackerConfig) -> Result<(), TrackerError> {
    let mut store = WorkoutStore::open(&config.db_path)?;
    store.initialize_settings()?;
    let today = Utc::now().date_naive();

    match cli.command {
        Command::Generate { prompt } => {
            let client = GenerationClient::from_config(&config)?;
            let mut session = PromptSession::new();
            let prompt = prompt.join(" ");
            match session.submit(&client, &mut store, &prompt).await {
                Some(recorded) => print_workout(&recorded.workout),
                None => {
                    let failure = session
                        .failure()
                        .cloned()
                        .unwrap_or_else(|| TrackerError::remote("no plan returned", None));
                    store.close()?;
                    return Err(failure);
                }
            }
        }
        Command::Workouts { part } => {
            let workouts: Vec<Workout> = store
                .get_workouts()?
                .into_iter()
                .filter(|w| part.is_none_or(|p| w.body_parts().contains(&p)))
                .collect();
            if workouts.is_empty() {
                println!("No workouts yet");
            }
            for w in workouts {
                println!(
                    "{}  {}  {:>2} exercises  {}{}",
                    w.id,
                    w.date.format("%Y-%m-%d %H:%M"),
                    w.exercises.len(),
                    w.prompt.as_deref().unwrap_or("-"),
                    if w.completed { "  ✓" } else { "" }
                );
            }
        }
        Command::Show { id } => {
            let view = load_workout_view(&store, id.as_deref(), today)?;
            match &view.workout {
                Some(workout) => print_workout(workout),
                None => println!("No workout selected"),
            }
            println!();
            print!("{}", render_heatmap(&view.heatmap));
        }
        Command::Complete { id, undo } => {
            let workout = store.set_workout_completed(&id, !undo)?;
            println!(
                "Workout {} marked {}",
                workout.id,
                if workout.completed { "completed" } else { "not completed" }
            );
        }
        Command::Heatmap => {
            let grid = liftmap::load_heatmap(&store, today)?;
            print!("{}", render_heatmap(&grid));
        }
        Command::Health => {
            let client = GenerationClient::from_config(&config)?;
            if client.health_check().await {
                println!("{} is healthy", client.base_url());
            } else {
                println!("{} is unhealthy", client.base_url());
            }
        }
    }

    store.close()
}

#[tokio::main]
async fn main() -> ExitCode {
    liftmap::init_logging();

    let cli = Cli::parse();
    let mut config = TrackerConfig::from_env();
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(api) = &cli.api {
        config.api_endpoint = api.trim_end_matches('/').to_string();
    }

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
