use crate::crawler::CrawlReport;
use crate::search::SearchHit;
use std::io::{self, Write};

pub const RESULTS_BANNER: &str = "----------- Search Results -----------";
pub const NO_RESULTS_BANNER: &str = "----------- No search results found :( -----------";

/// Writes ranked hits as a numbered list, or the no-results banner
pub fn write_search_results<W: Write>(out: &mut W, hits: &[SearchHit]) -> io::Result<()> {
    if hits.is_empty() {
        writeln!(out, "{}", NO_RESULTS_BANNER)?;
        return Ok(());
    }

    writeln!(out, "{}", RESULTS_BANNER)?;
    for (i, hit) in hits.iter().enumerate() {
        writeln!(out, "{}. {} (score {})", i + 1, hit.url, hit.score)?;
    }
    Ok(())
}

pub fn print_search_results(hits: &[SearchHit]) -> io::Result<()> {
    let stdout = io::stdout();
    write_search_results(&mut stdout.lock(), hits)
}

/// Writes the end-of-run totals
pub fn write_crawl_report<W: Write>(out: &mut W, report: &CrawlReport) -> io::Result<()> {
    writeln!(out, "=== Crawl Report ===")?;
    writeln!(out, "  Pages inserted: {}", report.pages_inserted)?;
    writeln!(out, "  Pages updated: {}", report.pages_updated)?;
    writeln!(out, "  Pages already stored: {}", report.pages_skipped)?;
    writeln!(out, "  Pages failed: {}", report.pages_failed)?;
    writeln!(out, "  Links accepted: {}", report.links_accepted)?;
    if report.links_capped > 0 {
        writeln!(out, "  Links not crawled (caps): {}", report.links_capped)?;
    }
    Ok(())
}
