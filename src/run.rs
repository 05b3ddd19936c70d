use anyhow::{bail, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::app::{App, RecipeDraft, RecipeEdit};
use crate::export;
use crate::models::{recipe_lines, recipe_meta, most_cooked, suggested_staples, times_cooked};
use crate::plan::Selection;

pub(crate) fn as_cli(args: &[String], app: &mut App) -> Result<()> {
    match args[1].as_str() {
        "list" | "ls" => cli_list(app),
        "show" => cli_show(&args[2..], app),
        "add" => cli_add(&args[2..], app),
        "edit" => cli_edit(&args[2..], app),
        "rename" => cli_rename(&args[2..], app),
        "delete" | "rm" => cli_delete(&args[2..], app),
        "duplicate" | "dup" => cli_duplicate(&args[2..], app),
        "rate" => cli_rate(&args[2..], app),
        "plan" => cli_plan(&args[2..], app),
        "recommend" => cli_recommend(&args[2..], app),
        "quick" => cli_quick(app),
        "pantry" => cli_pantry(&args[2..], app),
        "price" => cli_price(&args[2..], app),
        "history" => cli_history(&args[2..], app),
        "migrate" => cli_migrate(&args[2..], app),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("mealplan {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("mealplan — recipe box, weekly meal planner, and shopping list builder");
    println!();
    println!("Usage: mealplan [--csv <dir>] [command]");
    println!();
    println!("Commands:");
    println!("  (none)                          Show the dashboard");
    println!("  list                            List recipes");
    println!("  show <name>                     Show a recipe's details");
    println!("  add <name> --ingredients <block>");
    println!("                                  Add a recipe; one `name, qty, unit[, category]`");
    println!("                                  per line (newlines or ';' separate lines)");
    println!("    --tags <tags> --cook-time <t> --rating <1-5> --source <s>");
    println!("    --url <u> --servings <n> --notes <text> --prep-friendly");
    println!("  edit <name> [--tags|--cook-time|--source|--url|--servings|--notes|--prep-friendly <v>]");
    println!("                                  Update recipe metadata on every line");
    println!("  rename <old> <new>              Rename a recipe");
    println!("  delete <name>                   Delete a recipe");
    println!("  duplicate <name>                Copy a recipe as '<name> (Copy)'");
    println!("  rate <name> <rating>            Rate a recipe 1-5");
    println!("  plan <name[=servings]>...       Build a shopping list for the week");
    println!("    --out <file>                  Also write the list as CSV");
    println!("    --detail <file>               Also write per-recipe detail CSV");
    println!("    --record <YYYY-MM-DD>         Also log the meals against that week");
    println!("  recommend [n]                   Suggest what to cook (default 5)");
    println!("  quick                           List quick meals (≤25 min)");
    println!("  pantry [list|add <i>|remove <i>|suggest]");
    println!("  price <set <i> <unit> <price>|list|history [term]|missing|export [path]>");
    println!("  history [list|record <date> <names>...|remove <date> <name>|clear|export [path]]");
    println!("  migrate <dir>                   Import CSV tables from a directory");
    println!("  --help, -h                      Show this help");
    println!("  --version, -V                   Show version");
}

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid date '{s}' (expected YYYY-MM-DD)"))
}

// ── Dashboard ────────────────────────────────────────────────

pub(crate) fn dashboard(app: &App) -> Result<()> {
    let stats = app.stats();
    println!("Meal Planner");
    println!("{}", "─".repeat(40));
    println!("  Recipes:        {}", stats.recipe_count);
    println!("  Meals logged:   {}", stats.meals_logged);
    println!("  Weeks tracked:  {}", stats.weeks_tracked);
    println!("  Pantry staples: {}", stats.pantry_count);
    println!("  Priced items:   {}", stats.priced_ingredients);
    if let Some(avg) = stats.avg_rating {
        println!("  Avg rating:     {avg:.1}/5");
    }

    let top = app.top_rated();
    if !top.is_empty() {
        println!();
        println!("Top Rated:");
        for (name, rating) in top.iter().take(5) {
            println!("  {rating:.0}/5  {name}");
        }
    }

    let quick = app.quick_meals();
    if !quick.is_empty() {
        println!();
        println!("Quick Meals (≤25 min):");
        for name in quick.iter().take(5) {
            println!("  {name}");
        }
    }

    let cooked = most_cooked(&app.history);
    if !cooked.is_empty() {
        println!();
        println!("Most Cooked:");
        for (name, count) in cooked.iter().take(5) {
            println!("  {count}×  {name}");
        }
    }

    let recs = app.recommendations(chrono::Local::now().date_naive(), 3);
    if !recs.is_empty() {
        println!();
        println!("Try This Week:");
        for rec in &recs {
            println!("  {}  ({})", rec.recipe_name, rec.reason_line());
        }
    }
    Ok(())
}

// ── Recipes ──────────────────────────────────────────────────

fn cli_list(app: &mut App) -> Result<()> {
    let names = app.recipe_names();
    if names.is_empty() {
        println!("No recipes yet. Add one with: mealplan add <name> --ingredients <block>");
        return Ok(());
    }
    println!("{:<30} {:<8} {:<12} Cooked", "Name", "Rating", "Cook Time");
    println!("{}", "─".repeat(60));
    for name in &names {
        let meta = recipe_meta(&app.recipes, name);
        let rating = meta.map(|m| m.rating.as_str()).unwrap_or("");
        let cook_time = meta.map(|m| m.cook_time.as_str()).unwrap_or("");
        let cooked = times_cooked(&app.history, name);
        println!("{name:<30} {rating:<8} {cook_time:<12} {cooked}");
    }
    Ok(())
}

fn cli_show(args: &[String], app: &mut App) -> Result<()> {
    let Some(name) = args.first() else {
        bail!("Usage: mealplan show <name>");
    };
    let Some(meta) = recipe_meta(&app.recipes, name) else {
        bail!("No recipe named '{name}'");
    };

    println!("{name}");
    println!("{}", "─".repeat(40));
    if !meta.rating.is_empty() {
        println!("  Rating:    {}/5", meta.rating);
    }
    if !meta.cook_time.is_empty() {
        println!("  Cook time: {}", meta.cook_time);
    }
    println!("  Servings:  {}", meta.base_servings());
    if !meta.tags.is_empty() {
        println!("  Tags:      {}", meta.tags);
    }
    if !meta.source.is_empty() {
        println!("  Source:    {}", meta.source);
    }
    if !meta.notes.is_empty() {
        println!("  Notes:     {}", meta.notes);
    }
    let cooked = times_cooked(&app.history, name);
    if cooked > 0 {
        println!("  Cooked:    {cooked}×");
    }

    println!();
    println!("Ingredients:");
    for line in recipe_lines(&app.recipes, name) {
        let category = if line.category.is_empty() {
            String::new()
        } else {
            format!("  ({})", line.category)
        };
        println!("  {} {} {}{category}", line.quantity, line.unit, line.ingredient);
    }
    Ok(())
}

fn cli_add(args: &[String], app: &mut App) -> Result<()> {
    let Some(name) = args.first().filter(|a| !a.starts_with("--")) else {
        bail!("Usage: mealplan add <name> --ingredients <block>");
    };
    let Some(block) = flag_value(args, "--ingredients") else {
        bail!("Missing --ingredients. One `name, qty, unit[, category]` per line");
    };

    let mut draft = RecipeDraft::named(name.as_str());
    if let Some(v) = flag_value(args, "--tags") {
        draft.tags = v.to_string();
    }
    if let Some(v) = flag_value(args, "--cook-time") {
        draft.cook_time = v.to_string();
    }
    if let Some(v) = flag_value(args, "--rating") {
        draft.rating = v.to_string();
    }
    if let Some(v) = flag_value(args, "--source") {
        draft.source = v.to_string();
    }
    if let Some(v) = flag_value(args, "--url") {
        draft.source_url = v.to_string();
    }
    if let Some(v) = flag_value(args, "--servings") {
        draft.servings = v
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid --servings '{v}'"))?;
    }
    if let Some(v) = flag_value(args, "--notes") {
        draft.notes = v.to_string();
    }
    draft.prep_friendly = has_flag(args, "--prep-friendly");

    // Shells make literal newlines awkward; ';' works as a separator too.
    let block = block.replace(';', "\n");
    let errors = app.add_recipe(&draft, &block)?;
    let lines = recipe_lines(&app.recipes, name).len();
    println!("Added '{name}' with {lines} ingredient(s)");
    for e in &errors {
        eprintln!("Skipped line: {e}");
    }
    Ok(())
}

fn cli_edit(args: &[String], app: &mut App) -> Result<()> {
    let Some(name) = args.first().filter(|a| !a.starts_with("--")) else {
        bail!("Usage: mealplan edit <name> [--tags <t>] [--cook-time <t>] [--source <s>] [--url <u>] [--servings <n>] [--notes <text>] [--prep-friendly <true|false>]");
    };

    let servings = match flag_value(args, "--servings") {
        Some(v) => Some(
            v.parse()
                .map_err(|_| anyhow::anyhow!("Invalid --servings '{v}'"))?,
        ),
        None => None,
    };
    let prep_friendly = match flag_value(args, "--prep-friendly") {
        Some("true") | Some("1") => Some(true),
        Some("false") | Some("0") => Some(false),
        Some(other) => bail!("Invalid --prep-friendly '{other}' (expected true or false)"),
        None => None,
    };
    let edit = RecipeEdit {
        tags: flag_value(args, "--tags").map(str::to_string),
        cook_time: flag_value(args, "--cook-time").map(str::to_string),
        source: flag_value(args, "--source").map(str::to_string),
        source_url: flag_value(args, "--url").map(str::to_string),
        notes: flag_value(args, "--notes").map(str::to_string),
        servings,
        prep_friendly,
    };
    if edit.is_empty() {
        bail!("Nothing to change; pass at least one field flag");
    }

    app.edit_recipe(name, &edit)?;
    println!("Updated '{name}'");
    Ok(())
}

fn cli_rename(args: &[String], app: &mut App) -> Result<()> {
    let [old, new] = args else {
        bail!("Usage: mealplan rename <old> <new>");
    };
    app.rename_recipe(old, new)?;
    println!("Renamed '{old}' to '{new}'");
    Ok(())
}

fn cli_delete(args: &[String], app: &mut App) -> Result<()> {
    let Some(name) = args.first() else {
        bail!("Usage: mealplan delete <name>");
    };
    app.delete_recipe(name)?;
    println!("Deleted '{name}'");
    Ok(())
}

fn cli_duplicate(args: &[String], app: &mut App) -> Result<()> {
    let Some(name) = args.first() else {
        bail!("Usage: mealplan duplicate <name>");
    };
    let copy = app.duplicate_recipe(name)?;
    println!("Created '{copy}'");
    Ok(())
}

fn cli_rate(args: &[String], app: &mut App) -> Result<()> {
    let [name, rating] = args else {
        bail!("Usage: mealplan rate <name> <rating>");
    };
    let rating: f64 = rating
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid rating '{rating}'"))?;
    app.set_rating(name, rating)?;
    println!("Rated '{name}' {rating}/5");
    Ok(())
}

// ── Planning ─────────────────────────────────────────────────

fn cli_plan(args: &[String], app: &mut App) -> Result<()> {
    let mut selection = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg.starts_with("--") {
            skip_next = matches!(arg.as_str(), "--out" | "--detail" | "--record");
            continue;
        }
        selection.push(parse_selection(arg, app)?);
    }
    if selection.is_empty() {
        bail!("Usage: mealplan plan <name[=servings]>... [--out <file>] [--detail <file>] [--record <date>]");
    }

    let list = app.shopping_list(&selection);

    println!("Shopping List");
    println!("{}", "─".repeat(60));
    let mut last_category = String::new();
    for line in &list.lines {
        if line.category != last_category {
            let heading = if line.category.is_empty() {
                "Other"
            } else {
                &line.category
            };
            println!("{heading}:");
            last_category = line.category.clone();
        }
        println!(
            "  {} {} {}  {}  [{}]",
            line.quantity,
            line.unit,
            line.ingredient,
            export::format_price(line.item_cost),
            line.used_in,
        );
    }
    if list.pantry_excluded > 0 {
        println!();
        println!("({} pantry staple(s) excluded)", list.pantry_excluded);
    }

    println!();
    println!("  Meal cost:     {}", export::format_price(list.meal_cost));
    println!(
        "  Shopping cost: {}",
        export::format_price(list.shopping_cost)
    );
    if let Some(per_serving) = list.cost_per_serving {
        println!(
            "  Per serving:   {}  ({} servings)",
            export::format_price(per_serving),
            list.total_servings
        );
    }

    if !list.recipe_costs.is_empty() {
        println!();
        println!("Cost per recipe:");
        for rc in &list.recipe_costs {
            println!(
                "  {:<30} {}  ({}/serving)",
                rc.recipe_name,
                export::format_price(rc.cost),
                export::format_price(rc.per_serving()),
            );
        }
    }

    let missing = list.missing_prices();
    if !missing.is_empty() {
        let items: Vec<String> = missing
            .iter()
            .take(5)
            .map(|l| format!("{} ({})", l.ingredient, l.unit))
            .collect();
        let more = if missing.len() > 5 { "…" } else { "" };
        eprintln!();
        eprintln!(
            "Warning: {} item(s) missing pricing: {}{more}",
            missing.len(),
            items.join(", ")
        );
    }

    if let Some(out) = flag_value(args, "--out") {
        let rows = export::write_shopping_list(Path::new(out), &list)?;
        println!();
        println!("Wrote {rows} line(s) to {out}");
    }
    if let Some(detail) = flag_value(args, "--detail") {
        let rows = export::write_week_detail(Path::new(detail), &app.recipes, &selection)?;
        println!("Wrote {rows} row(s) to {detail}");
    }
    if let Some(date) = flag_value(args, "--record") {
        let week_start = parse_date(date)?;
        let names: Vec<String> = selection.iter().map(|s| s.recipe_name.clone()).collect();
        let added = app.record_week(week_start, &names)?;
        println!("Logged {added} meal(s) for week of {week_start}");
    }
    Ok(())
}

/// "Name" or "Name=4" (serving override).
fn parse_selection(arg: &str, app: &App) -> Result<Selection> {
    let (name, servings) = match arg.split_once('=') {
        Some((name, servings)) => {
            let servings: u32 = servings
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid servings in '{arg}'"))?;
            (name, Some(servings))
        }
        None => (arg, None),
    };
    if !app.has_recipe(name) {
        bail!("No recipe named '{name}'");
    }
    Ok(match servings {
        Some(s) => Selection::with_servings(name, s),
        None => Selection::new(name),
    })
}

fn cli_recommend(args: &[String], app: &mut App) -> Result<()> {
    let top_n: usize = match args.first().filter(|a| !a.starts_with('-')) {
        Some(n) => n
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid count '{n}'"))?,
        None => 5,
    };
    let recs = app.recommendations(chrono::Local::now().date_naive(), top_n);
    if recs.is_empty() {
        println!("No recipes to recommend yet");
        return Ok(());
    }
    for rec in &recs {
        println!("{:<30} {}", rec.recipe_name, rec.reason_line());
    }
    Ok(())
}

fn cli_quick(app: &mut App) -> Result<()> {
    let quick = app.quick_meals();
    if quick.is_empty() {
        println!("No quick meals found");
        return Ok(());
    }
    for name in &quick {
        println!("{name}");
    }
    Ok(())
}

// ── Pantry ───────────────────────────────────────────────────

fn cli_pantry(args: &[String], app: &mut App) -> Result<()> {
    match args.first().map(String::as_str) {
        None | Some("list") => {
            if app.pantry.is_empty() {
                println!("Pantry is empty");
            } else {
                for staple in &app.pantry {
                    println!("{staple}");
                }
            }
            Ok(())
        }
        Some("add") => {
            let Some(ingredient) = args.get(1) else {
                bail!("Usage: mealplan pantry add <ingredient>");
            };
            if app.add_pantry_staple(ingredient)? {
                println!("Added '{ingredient}' to pantry");
            } else {
                println!("'{ingredient}' is already in the pantry");
            }
            Ok(())
        }
        Some("remove") => {
            let Some(ingredient) = args.get(1) else {
                bail!("Usage: mealplan pantry remove <ingredient>");
            };
            if app.remove_pantry_staple(ingredient)? {
                println!("Removed '{ingredient}' from pantry");
            } else {
                println!("'{ingredient}' is not in the pantry");
            }
            Ok(())
        }
        Some("suggest") => {
            let suggestions = suggested_staples(&app.pantry);
            if suggestions.is_empty() {
                println!("All the common staples are already in your pantry");
            } else {
                println!("Common staples you haven't added:");
                for s in suggestions {
                    println!("  {s}");
                }
            }
            Ok(())
        }
        Some(other) => bail!("Unknown pantry subcommand: {other}"),
    }
}

// ── Pricing ──────────────────────────────────────────────────

fn cli_price(args: &[String], app: &mut App) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("set") => {
            let [_, ingredient, unit, price] = args else {
                bail!("Usage: mealplan price set <ingredient> <unit> <price>");
            };
            let price = Decimal::from_str(price)
                .map_err(|_| anyhow::anyhow!("Invalid price '{price}'"))?;
            app.set_price(ingredient, unit, price)?;
            println!("Set {ingredient} ({unit}) to {}", export::format_price(price));
            Ok(())
        }
        None | Some("list") => {
            if app.pricing.is_empty() {
                println!("No prices on file");
                return Ok(());
            }
            println!("{:<24} {:<10} {:<10} Updated", "Ingredient", "Unit", "Price");
            println!("{}", "─".repeat(60));
            for price in &app.pricing {
                println!(
                    "{:<24} {:<10} {:<10} {}",
                    price.ingredient,
                    price.unit,
                    export::format_price(price.price_per_unit),
                    price.last_updated,
                );
            }
            Ok(())
        }
        Some("history") => {
            let term = args.get(1).map(|t| t.to_lowercase());
            let entries: Vec<_> = app
                .price_history
                .iter()
                .filter(|e| match &term {
                    Some(t) => e.ingredient.to_lowercase().contains(t),
                    None => true,
                })
                .collect();
            if entries.is_empty() {
                println!("No price changes logged");
                return Ok(());
            }
            println!(
                "{:<24} {:<8} {:<10} {:<10} {:<8} When",
                "Ingredient", "Unit", "Old", "New", "Change"
            );
            println!("{}", "─".repeat(76));
            for entry in entries {
                println!(
                    "{:<24} {:<8} {:<10} {:<10} {:<8} {}",
                    entry.ingredient,
                    entry.unit,
                    export::format_price(entry.old_price),
                    export::format_price(entry.new_price),
                    entry.change_label(),
                    entry.changed_at,
                );
            }
            Ok(())
        }
        Some("missing") => {
            let missing = app.unpriced_ingredients();
            if missing.is_empty() {
                println!("Every recipe ingredient has a price");
            } else {
                println!("{} ingredient(s) without pricing:", missing.len());
                for (ingredient, unit) in &missing {
                    println!("  {ingredient} ({unit})");
                }
            }
            Ok(())
        }
        Some("export") => {
            let path = export_path(&args[1..], "ingredient_pricing");
            let rows = export::write_pricing(Path::new(&path), &app.pricing)?;
            println!("Exported {rows} price(s) to {path}");
            Ok(())
        }
        Some(other) => bail!("Unknown price subcommand: {other}"),
    }
}

// ── History ──────────────────────────────────────────────────

fn cli_history(args: &[String], app: &mut App) -> Result<()> {
    match args.first().map(String::as_str) {
        None | Some("list") => {
            if app.history.is_empty() {
                println!("No meals logged yet");
                return Ok(());
            }
            let mut weeks: Vec<_> = app.history.iter().map(|h| h.week_start).collect();
            weeks.sort();
            weeks.dedup();
            for week in weeks.iter().rev() {
                println!("Week of {week}:");
                for entry in app.history.iter().filter(|h| h.week_start == *week) {
                    println!("  {}", entry.recipe_name);
                }
            }
            println!();
            println!("Most cooked:");
            for (name, count) in most_cooked(&app.history).into_iter().take(5) {
                println!("  {count}×  {name}");
            }
            Ok(())
        }
        Some("record") => {
            let Some(date) = args.get(1) else {
                bail!("Usage: mealplan history record <YYYY-MM-DD> <names>...");
            };
            let week_start = parse_date(date)?;
            let names: Vec<String> = args[2..].to_vec();
            if names.is_empty() {
                bail!("Usage: mealplan history record <YYYY-MM-DD> <names>...");
            }
            let added = app.record_week(week_start, &names)?;
            println!("Logged {added} meal(s) for week of {week_start}");
            Ok(())
        }
        Some("remove") => {
            let (Some(date), Some(name)) = (args.get(1), args.get(2)) else {
                bail!("Usage: mealplan history remove <YYYY-MM-DD> <name>");
            };
            let week_start = parse_date(date)?;
            if app.remove_history_entry(week_start, name)? {
                println!("Removed '{name}' from week of {week_start}");
            } else {
                println!("No entry for '{name}' in week of {week_start}");
            }
            Ok(())
        }
        Some("clear") => {
            let removed = app.clear_history()?;
            println!("Cleared {removed} history entr(ies)");
            Ok(())
        }
        Some("export") => {
            let path = export_path(&args[1..], "meal_history");
            let rows = export::write_history(Path::new(&path), &app.history)?;
            println!("Exported {rows} entr(ies) to {path}");
            Ok(())
        }
        Some(other) => bail!("Unknown history subcommand: {other}"),
    }
}

fn export_path(args: &[String], stem: &str) -> String {
    args.first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/mealplan-{stem}.csv")
        })
}

// ── Migration ────────────────────────────────────────────────

fn cli_migrate(args: &[String], app: &mut App) -> Result<()> {
    let Some(dir) = args.first() else {
        bail!("Usage: mealplan migrate <dir>");
    };
    let dir = shellexpand(dir);
    let path = Path::new(&dir);
    if !path.is_dir() {
        bail!("Not a directory: {dir}");
    }
    let copied = app.import_tables(path)?;
    if copied.is_empty() {
        println!("No tables found in {dir}");
        return Ok(());
    }
    for (file, rows) in &copied {
        println!("{file}: {rows} row(s)");
    }
    Ok(())
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}
