pub mod types;

pub use types::MatchRecord;

use colored::Colorize;
use std::io::{self, Write};

const TAGLINE: &str =
    "Search a GitHub user's repositories' commit patches to identify unique names and email addresses";

/// Write the identifying banner. Purely cosmetic.
pub fn write_banner<W: Write>(out: &mut W) -> io::Result<()> {
    let rule = "-".repeat(TAGLINE.len() + 2);
    writeln!(out)?;
    writeln!(out, "{}", rule.dimmed())?;
    writeln!(out, " {}", "patchfinder".bold().cyan())?;
    writeln!(out, " {}", TAGLINE)?;
    writeln!(out, "{}", rule.dimmed())?;
    writeln!(out)?;
    out.flush()
}

/// Write one newly discovered identity as its own line.
pub fn write_identity<W: Write>(out: &mut W, identity: &str) -> io::Result<()> {
    writeln!(out, "{}", identity)?;
    out.flush()
}

/// Write a `Repository:` / `Commit URL:` pair followed by a blank line.
pub fn write_match<W: Write>(out: &mut W, record: &MatchRecord) -> io::Result<()> {
    writeln!(out, "Repository: {}", record.repository)?;
    writeln!(out, "Commit URL: {}", record.commit_url)?;
    writeln!(out)?;
    out.flush()
}
