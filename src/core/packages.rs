// src/core/packages.rs
//
// pacman naming and the text-level helpers around package installs. MSYS2
// prefixes native packages per subsystem (`mingw-w64-ucrt-x86_64-gtk4`);
// users type the short name and the prefix is derived from the active
// environment.

use crate::core::commons::quote_if_needed;

/// Package name prefixes for the known subsystems, longest first so prefix
/// stripping never truncates a longer sibling.
const KNOWN_PREFIXES: &[&str] = &[
    "mingw-w64-clang-aarch64-",
    "mingw-w64-clang-x86_64-",
    "mingw-w64-ucrt-x86_64-",
    "mingw-w64-x86_64-",
    "mingw-w64-i686-",
];

/// The package prefix for a subsystem name. `MSYS` packages carry no
/// prefix; an unrecognized subsystem gets the generic fallback so the
/// command still points somewhere plausible.
pub fn subsystem_prefix(environment: &str) -> String {
    match environment.to_uppercase().as_str() {
        "UCRT64" => "mingw-w64-ucrt-x86_64-".to_string(),
        "MINGW64" => "mingw-w64-x86_64-".to_string(),
        "MINGW32" => "mingw-w64-i686-".to_string(),
        "CLANG64" => "mingw-w64-clang-x86_64-".to_string(),
        "CLANGARM64" => "mingw-w64-clang-aarch64-".to_string(),
        "MSYS" => String::new(),
        other => format!("mingw-w64-{}-", other.to_lowercase()),
    }
}

/// The full pacman package name for a user-typed name. Names that already
/// carry a subsystem prefix pass through untouched.
pub fn full_package_name(environment: &str, name: &str) -> String {
    if name.starts_with("mingw-w64-") {
        return name.to_string();
    }
    format!("{}{}", subsystem_prefix(environment), name)
}

/// Strips the subsystem prefix back off, for matching against the stored
/// short-name library list.
pub fn short_package_name(name: &str) -> &str {
    for prefix in KNOWN_PREFIXES {
        if let Some(short) = name.strip_prefix(prefix) {
            return short;
        }
    }
    name
}

// --- COMMAND SHAPES ---

pub fn install_command(package: &str) -> String {
    format!("pacman -S --needed --noconfirm {}", quote_if_needed(package))
}

pub fn remove_command(package: &str) -> String {
    format!("pacman -R --noconfirm {}", quote_if_needed(package))
}

/// `-Ssq` keeps the output to bare package names, which is all the
/// results view shows.
pub fn search_command(term: &str) -> String {
    format!("pacman -Ssq {}", quote_if_needed(term))
}

/// Filters a `pacman -Ssq` listing down to packages belonging to the
/// active environment and strips the prefix for display. The MSYS
/// environment has no prefix, so everything passes through.
pub fn matching_short_names(listing: &str, environment: &str) -> Vec<String> {
    let prefix = subsystem_prefix(environment);
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| line.starts_with(&prefix))
        .map(|line| short_package_name(line).to_string())
        .collect()
}

/// Predicate for "is this package installed now". `pacman -Qi` exits
/// non-zero until the local database knows the package.
pub fn installed_predicate(package: &str) -> String {
    format!("pacman -Qi {}", quote_if_needed(package))
}

/// Predicate for "is this package gone now".
pub fn removed_predicate(package: &str) -> String {
    format!("! pacman -Qi {}", quote_if_needed(package))
}

/// Query listing every file a package owns, used to discover its
/// pkg-config metadata after an install lands.
pub fn owned_files_query(package: &str) -> String {
    format!("pacman -Qlq {}", quote_if_needed(package))
}

// --- OUTPUT PARSING & LIBRARY LIST EDITS ---

/// Extracts pkg-config module names from a `pacman -Qlq` file listing:
/// every `.pc` file under a `pkgconfig/` directory contributes its stem.
/// Order follows the listing; duplicates collapse to the first hit.
pub fn pc_stems(listing: &str) -> Vec<String> {
    let mut stems: Vec<String> = Vec::new();
    for line in listing.lines() {
        let path = line.trim();
        let Some(file) = path.strip_suffix(".pc").and_then(|p| p.rsplit('/').next()) else {
            continue;
        };
        if !path.contains("/pkgconfig/") || file.is_empty() {
            continue;
        }
        if !stems.iter().any(|s| s == file) {
            stems.push(file.to_string());
        }
    }
    stems
}

/// Appends newly discovered pkg-config modules to the space-separated
/// library list, keeping existing entries and their order.
pub fn merge_libraries(existing: &str, stems: &[String]) -> String {
    let mut entries: Vec<String> = existing.split_whitespace().map(String::from).collect();
    for stem in stems {
        if !entries.iter().any(|e| e == stem) {
            entries.push(stem.clone());
        }
    }
    entries.join(" ")
}

/// Collapses a user-entered library list into the space-separated form
/// `build.libraries` and `pkg-config` expect. Commas and runs of
/// whitespace both act as separators.
pub fn normalize_libraries(input: &str) -> String {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|entry| !entry.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Best-effort inverse of an install: drops library entries that contain
/// the removed package's short name as a substring. Deliberately fuzzy:
/// `libadwaita` removes `libadwaita-1`, but a short package name can take
/// unrelated entries with it.
pub fn prune_libraries(existing: &str, package: &str) -> String {
    let needle = short_package_name(package).to_lowercase();
    if needle.is_empty() {
        return existing.split_whitespace().collect::<Vec<_>>().join(" ");
    }
    existing
        .split_whitespace()
        .filter(|entry| !entry.to_lowercase().contains(&needle))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_subsystem_maps_to_its_prefix() {
        assert_eq!(subsystem_prefix("UCRT64"), "mingw-w64-ucrt-x86_64-");
        assert_eq!(subsystem_prefix("MINGW64"), "mingw-w64-x86_64-");
        assert_eq!(subsystem_prefix("MINGW32"), "mingw-w64-i686-");
        assert_eq!(subsystem_prefix("CLANG64"), "mingw-w64-clang-x86_64-");
        assert_eq!(subsystem_prefix("CLANGARM64"), "mingw-w64-clang-aarch64-");
        assert_eq!(subsystem_prefix("MSYS"), "");
    }

    #[test]
    fn unknown_subsystems_get_the_generic_fallback() {
        assert_eq!(subsystem_prefix("ARM64EC"), "mingw-w64-arm64ec-");
    }

    #[test]
    fn short_names_gain_the_prefix_full_names_do_not() {
        assert_eq!(
            full_package_name("UCRT64", "gtk4"),
            "mingw-w64-ucrt-x86_64-gtk4"
        );
        assert_eq!(
            full_package_name("UCRT64", "mingw-w64-x86_64-gtk4"),
            "mingw-w64-x86_64-gtk4"
        );
        assert_eq!(full_package_name("MSYS", "make"), "make");
    }

    #[test]
    fn prefix_stripping_handles_the_clang_variants() {
        assert_eq!(short_package_name("mingw-w64-clang-x86_64-gtk4"), "gtk4");
        assert_eq!(
            short_package_name("mingw-w64-clang-aarch64-libadwaita"),
            "libadwaita"
        );
        assert_eq!(short_package_name("make"), "make");
    }

    #[test]
    fn predicates_wrap_pacman_query() {
        assert_eq!(
            installed_predicate("mingw-w64-ucrt-x86_64-gtk4"),
            "pacman -Qi mingw-w64-ucrt-x86_64-gtk4"
        );
        assert_eq!(
            removed_predicate("mingw-w64-ucrt-x86_64-gtk4"),
            "! pacman -Qi mingw-w64-ucrt-x86_64-gtk4"
        );
    }

    #[test]
    fn search_results_are_scoped_to_the_environment() {
        let listing = "\
mingw-w64-ucrt-x86_64-gtk4
mingw-w64-ucrt-x86_64-gtkmm4
mingw-w64-clang-x86_64-gtk4
msys2-runtime
";
        assert_eq!(
            matching_short_names(listing, "UCRT64"),
            vec!["gtk4", "gtkmm4"]
        );
        assert_eq!(matching_short_names(listing, "MSYS").len(), 4);
    }

    #[test]
    fn pc_stems_come_from_pkgconfig_entries_only() {
        let listing = "\
/ucrt64/include/gtk-4.0/gtk/gtk.h
/ucrt64/lib/pkgconfig/gtk4.pc
/ucrt64/lib/pkgconfig/gtk4-unix-print.pc
/ucrt64/share/doc/gtk4/README.pc
/ucrt64/lib/pkgconfig/gtk4.pc
";
        assert_eq!(pc_stems(listing), vec!["gtk4", "gtk4-unix-print"]);
    }

    #[test]
    fn merge_keeps_existing_entries_first() {
        let merged = merge_libraries(
            "gtk4",
            &["gtk4".to_string(), "libadwaita-1".to_string()],
        );
        assert_eq!(merged, "gtk4 libadwaita-1");
    }

    #[test]
    fn library_lists_accept_commas_and_whitespace() {
        assert_eq!(normalize_libraries("gtk4,epoxy"), "gtk4 epoxy");
        assert_eq!(
            normalize_libraries("gtk4, epoxy  gtkmm-4.0"),
            "gtk4 epoxy gtkmm-4.0"
        );
        assert_eq!(normalize_libraries("gtk4"), "gtk4");
        assert_eq!(normalize_libraries(""), "");
    }

    #[test]
    fn prune_drops_entries_containing_the_short_name() {
        let pruned = prune_libraries(
            "gtk4 libadwaita-1 epoxy",
            "mingw-w64-ucrt-x86_64-libadwaita",
        );
        assert_eq!(pruned, "gtk4 epoxy");
    }

    #[test]
    fn prune_leaves_unrelated_entries_alone() {
        assert_eq!(
            prune_libraries("gtk4 epoxy", "mingw-w64-ucrt-x86_64-cairo"),
            "gtk4 epoxy"
        );
    }
}
