//! Replay a stored history: prints each day's Life Score as of that day.
//!
//! Usage: `replay <user_id> [from YYYY-MM-DD] [to YYYY-MM-DD]`
//! Reads `$DATA_DIR` (default `data`) and the scoring config like the server.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use axis_life_score::{
    compute_life_score, init_tracing, store::HistoryStore, FileStore, ScoringConfig, Settings,
};

fn parse_date(arg: Option<String>) -> Result<Option<NaiveDate>> {
    arg.map(|s| {
        NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| format!("invalid date {s:?}"))
    })
    .transpose()
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let settings = Settings::from_env();
    init_tracing(settings.log_json);

    let mut args = std::env::args().skip(1);
    let Some(user_id) = args.next() else {
        bail!("usage: replay <user_id> [from YYYY-MM-DD] [to YYYY-MM-DD]");
    };
    let from = parse_date(args.next())?;
    let to = parse_date(args.next())?;

    let config = ScoringConfig::load_default()?;
    let store = FileStore::new(&settings.data_dir);
    let history = store.load_history(&user_id)?;

    if history.is_empty() {
        println!("no entries for {user_id}");
        return Ok(());
    }

    for entry in history.entries() {
        if from.is_some_and(|f| entry.date < f) || to.is_some_and(|t| entry.date > t) {
            continue;
        }
        let r = compute_life_score(&history, entry.date, &config);
        println!(
            "{}  score {:>3} {:<6}  mood {:>3.0}  stability {:>3.0}",
            entry.date,
            r.score,
            r.band.as_str(),
            r.mood * 100.0,
            r.stability.value * 100.0
        );
    }
    Ok(())
}
