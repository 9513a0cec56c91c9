use crate::storage::Document;
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

/// Returns true for the accepted confirmations: `y`, `Y`, `yes`, `YES`
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim(), "y" | "Y" | "yes" | "YES")
}

pub fn write_update_prompt<W: Write>(out: &mut W, existing: &Document) -> io::Result<()> {
    write!(
        out,
        "Entry already exists, it was created on {}. Do you wish to update it?\n[y/n] ",
        existing.time
    )?;
    out.flush()
}

/// Writes the stored `{url: seen}` mapping as pretty JSON
pub fn write_existing_entry<W: Write>(out: &mut W, existing: &Document) -> io::Result<()> {
    let mut entry = BTreeMap::new();
    entry.insert(existing.url.as_str(), &existing.seen);
    let json = serde_json::to_string_pretty(&entry).map_err(io::Error::from)?;
    writeln!(out, "{}", json)
}

/// Asks whether an already stored seed should be refreshed
///
/// On refusal the stored entry is written to `output` and `false` is
/// returned. End of input counts as refusal.
pub fn confirm_update<R: BufRead, W: Write>(
    mut input: R,
    output: &mut W,
    existing: &Document,
) -> io::Result<bool> {
    write_update_prompt(output, existing)?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;

    if is_affirmative(&answer) {
        return Ok(true);
    }

    write_existing_entry(output, existing)?;
    Ok(false)
}
