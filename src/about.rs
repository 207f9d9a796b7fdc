//! Credits shown in `--help` and `foiex stats`.

pub const TAGLINE: &str = "A finding aid for the emails of Documenting COVID-19 (https://documentingcovid19.io).";

/// Required wording whenever data from the archive is reused.
pub const ATTRIBUTION: &str = "All emails and documents come from the Documenting COVID-19 project of the \
Brown Institute for Media Innovation (https://documentingcovid19.io); any use of this data must attribute \
the \"Documenting COVID-19 project at The Brown Institute for Media Innovation.\"";

pub const CREDITS: &str = "Columbia University's History Lab (http://history-lab.org) created the explorer \
and its processing tools under a grant from the Mellon Foundation's Email Archives: Building Capacity and \
Community program.";

/// The About block: attribution, then credits.
pub fn about() -> String {
    format!("About:\n  {ATTRIBUTION}\n\n  {CREDITS}")
}
