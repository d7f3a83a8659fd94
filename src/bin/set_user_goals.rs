//! Utility to set a user's goals in the database
//!
//! Usage: set_user_goals <owner_id> <calorie_goal> <water_goal_ml> [current_weight_kg] [goal_weight_kg]

use nutrilog::config::Config;
use nutrilog::models::{User, UserUpdate};

fn parse_arg(args: &[String], index: usize, name: &str) -> Result<Option<f64>, Box<dyn std::error::Error>> {
    match args.get(index) {
        Some(value) => Ok(Some(
            value
                .parse::<f64>()
                .map_err(|e| format!("Invalid {} '{}': {}", name, value, e))?,
        )),
        None => Ok(None),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!(
            "Usage: {} <owner_id> <calorie_goal> <water_goal_ml> [current_weight_kg] [goal_weight_kg]",
            args.first().map(String::as_str).unwrap_or("set_user_goals")
        );
        std::process::exit(2);
    }

    let owner_id: i64 = args[1]
        .parse()
        .map_err(|e| format!("Invalid owner id '{}': {}", args[1], e))?;

    let update = UserUpdate {
        daily_calorie_goal: parse_arg(&args, 2, "calorie goal")?,
        daily_water_goal_ml: parse_arg(&args, 3, "water goal")?,
        current_weight_kg: parse_arg(&args, 4, "current weight")?.map(Some),
        goal_weight_kg: parse_arg(&args, 5, "goal weight")?.map(Some),
        ..Default::default()
    };

    let config = Config::from_env()?;
    println!("Database path: {}", config.database_path.display());

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = nutrilog::db::Database::new(&config.database_path, 1)?;

    database.with_conn(|conn| {
        nutrilog::db::migrations::run_migrations(conn)?;
        Ok(())
    })?;

    let user = database.with_conn(|conn| User::update(conn, owner_id, &update))?;

    match user {
        Some(user) => {
            println!("Goals set for {} (id {}):", user.display_name, user.id);
            println!("  Calories: {} kcal/day", user.daily_calorie_goal);
            println!("  Water: {} ml/day", user.daily_water_goal_ml);
            if let Some(current) = user.current_weight_kg {
                println!("  Current weight: {} kg", current);
            }
            if let Some(goal) = user.goal_weight_kg {
                println!("  Goal weight: {} kg", goal);
            }
            println!("  Updated: {}", user.updated_at);
        }
        None => {
            eprintln!("User {} not found", owner_id);
            std::process::exit(1);
        }
    }

    Ok(())
}
