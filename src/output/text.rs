use super::*;
use crate::rating::{Ratable, Rating};
use colored::*;
use std::fmt::Write;

/// Plain-text leaderboards, one block per strategy run, then timings.
pub struct TextGenerator;

impl OutputGenerator for TextGenerator {
    fn generate(&self, report: &Report) -> Result<String> {
        let mut out = String::new();

        for run in &report.runs {
            writeln!(out, "\n{}", format!("Ratings ({}):", run.strategy).bright_cyan().bold())?;
            write_rating(&mut out, "Users", &run.leaderboards.users)?;
            write_rating(&mut out, "Repo commits", &run.leaderboards.repo_commits)?;
            write_rating(&mut out, "Repo watches", &run.leaderboards.repo_watches)?;
        }

        writeln!(out, "{}", "Timings:".bright_cyan().bold())?;
        for run in &report.runs {
            writeln!(out, "{}: {:.2}ms", run.strategy, run.elapsed_ms)?;
        }

        Ok(out)
    }
}

fn write_rating<T: Ratable>(out: &mut String, title: &str, rating: &Rating<T>) -> Result<()> {
    let heading = format!("{} (top {}):", title, rating.capacity());
    writeln!(out, "{}", heading.bright_white())?;
    if rating.is_empty() {
        writeln!(out, "no entries")?;
    } else {
        writeln!(out, "{}", rating.pretty())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::sample_tables;
    use crate::aggregate::{Aggregator, CommitCounting, Stats};

    #[test]
    fn renders_every_leaderboard_and_timing() {
        let stats = Aggregator::new(Strategy::SinglePass, CommitCounting::OnDemand)
            .run(&sample_tables())
            .unwrap();
        let report = Report {
            source: "memory".to_string(),
            generated_at: Utc::now(),
            runs: vec![StrategyRun {
                strategy: Strategy::SinglePass,
                elapsed_ms: 1.5,
                leaderboards: Leaderboards::build(&stats, 10),
            }],
        };

        let text = TextGenerator.generate(&report).unwrap();
        assert!(text.contains("1 (Rating: 6): ID: u1; Username: alice; Commits: 5; PREvents: 1;"));
        assert!(text.contains("1 (Rating: 4): ID: r2; Name: acme/web; Commits: 4;"));
        assert!(text.contains("2 (Rating: 1): ID: r3; Name: acme/cli; WatchEvents: 1;"));
        assert!(text.contains("single-pass: 1.50ms"));
    }

    #[test]
    fn empty_leaderboards_say_so() {
        let report = Report {
            source: "memory".to_string(),
            generated_at: Utc::now(),
            runs: vec![StrategyRun {
                strategy: Strategy::Rescan,
                elapsed_ms: 0.0,
                leaderboards: Leaderboards::build(&Stats::default(), 5),
            }],
        };

        let text = TextGenerator.generate(&report).unwrap();
        assert_eq!(text.matches("no entries").count(), 3);
        assert!(text.contains("(top 5):"));
    }
}
