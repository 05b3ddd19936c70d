mod app;
mod export;
mod ingest;
mod models;
mod plan;
mod pricing;
mod recommend;
mod run;
mod store;

use anyhow::{Context, Result};

fn main() -> Result<()> {
    let mut args: Vec<String> = std::env::args().collect();

    // --csv <dir> switches the backing store to one CSV file per table,
    // which is also the layout `migrate` imports from.
    let store: Box<dyn store::Store> = match take_csv_dir(&mut args)? {
        Some(dir) => Box::new(store::CsvStore::new(dir.into())),
        None => Box::new(store::SqliteStore::open(&get_db_path()?)?),
    };
    let mut app = app::App::load(store)?;

    match args.len() {
        0 | 1 => run::dashboard(&app),
        _ => run::as_cli(&args, &mut app),
    }
}

fn take_csv_dir(args: &mut Vec<String>) -> Result<Option<String>> {
    let Some(pos) = args.iter().position(|a| a == "--csv") else {
        return Ok(None);
    };
    if pos + 1 >= args.len() {
        anyhow::bail!("Missing value for --csv");
    }
    let dir = run::shellexpand(&args[pos + 1]);
    args.drain(pos..=pos + 1);
    Ok(Some(dir))
}

fn get_db_path() -> Result<std::path::PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "mealplan", "MealPlan")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join("mealplan.db"))
}

#[cfg(test)]
mod tests {
    use super::take_csv_dir;

    fn args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_take_csv_dir_drains_flag_and_value() {
        let mut a = args(&["mealplan", "--csv", "/tmp/tables", "list"]);
        let dir = take_csv_dir(&mut a).unwrap();
        assert_eq!(dir.as_deref(), Some("/tmp/tables"));
        assert_eq!(a, args(&["mealplan", "list"]));
    }

    #[test]
    fn test_take_csv_dir_absent() {
        let mut a = args(&["mealplan", "list"]);
        assert!(take_csv_dir(&mut a).unwrap().is_none());
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_take_csv_dir_missing_value_errors() {
        let mut a = args(&["mealplan", "list", "--csv"]);
        let err = take_csv_dir(&mut a).unwrap_err();
        assert!(err.to_string().contains("--csv"));
    }
}
