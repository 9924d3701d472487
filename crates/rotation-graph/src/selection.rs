//! Which sectors a viewer starts with. The selection itself is owned by the caller.

/// Sectors shown when nothing was selected before
pub const MAIN_SECTORS: &[&str] = &["AGRI", "BANK", "CONS", "ENERG", "FIN", "ICT", "PROP", "PETRO"];

/// Sectors to preselect out of `available`.
///
/// Keeps whatever of `previous` is still available; falls back to the main
/// sectors, then to everything.
pub fn default_selection(available: &[String], previous: Option<&[String]>) -> Vec<String> {
    if let Some(previous) = previous {
        let kept: Vec<String> = previous
            .iter()
            .filter(|s| available.contains(s))
            .cloned()
            .collect();
        if !kept.is_empty() {
            return kept;
        }
    }

    let main: Vec<String> = MAIN_SECTORS
        .iter()
        .filter(|s| available.iter().any(|a| a == *s))
        .map(|s| s.to_string())
        .collect();
    if !main.is_empty() {
        return main;
    }

    available.to_vec()
}
