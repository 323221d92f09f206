//! Names owned by the upstream design-system vendor.
//!
//! Community components must not shadow these: creation and fork-target
//! naming reject them outright, while dependency installation redirects
//! them to the vendor's own installer. The catalog is static configuration
//! data, never derived at runtime. Matching is case-insensitive.

/// Core primitives shipped by the upstream vendor.
pub const RESERVED_PRIMITIVES: &[&str] = &[
    "accordion",
    "alert",
    "alert-dialog",
    "aspect-ratio",
    "avatar",
    "badge",
    "breadcrumb",
    "button",
    "calendar",
    "card",
    "carousel",
    "chart",
    "checkbox",
    "collapsible",
    "combobox",
    "command",
    "context-menu",
    "dialog",
    "drawer",
    "dropdown-menu",
    "form",
    "hover-card",
    "input",
    "input-otp",
    "label",
    "menubar",
    "navigation-menu",
    "pagination",
    "popover",
    "progress",
    "radio-group",
    "resizable",
    "scroll-area",
    "select",
    "separator",
    "sheet",
    "sidebar",
    "skeleton",
    "slider",
    "sonner",
    "switch",
    "table",
    "tabs",
    "textarea",
    "toast",
    "toaster",
    "toggle",
    "toggle-group",
    "tooltip",
];

/// Numbered vendor variants: `(prefix, highest published number)`.
///
/// Covers names like `block-01` through `block-20` and `calendar-12`.
pub const RESERVED_NUMBERED: &[(&str, u32)] = &[
    ("block", 20),
    ("chart", 20),
    ("calendar", 32),
    ("theme", 12),
    ("sidebar", 16),
    ("dashboard", 7),
    ("login", 5),
];

/// Membership test against the vendor catalog (case-insensitive).
pub fn is_reserved(name: &str) -> bool {
    let name = name.to_ascii_lowercase();

    if RESERVED_PRIMITIVES.contains(&name.as_str()) {
        return true;
    }

    // Numbered variants: "<prefix>-<nn>"
    if let Some((prefix, suffix)) = name.rsplit_once('-') {
        if let Ok(n) = suffix.parse::<u32>() {
            return RESERVED_NUMBERED
                .iter()
                .any(|&(p, max)| p == prefix && n >= 1 && n <= max);
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives_reserved() {
        assert!(is_reserved("button"));
        assert!(is_reserved("card"));
        assert!(is_reserved("dropdown-menu"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(is_reserved("Button"));
        assert!(is_reserved("CARD"));
    }

    #[test]
    fn test_numbered_variants() {
        assert!(is_reserved("block-01"));
        assert!(is_reserved("block-20"));
        assert!(is_reserved("calendar-32"));
        assert!(is_reserved("sidebar-16"));
        assert!(!is_reserved("block-21"));
        assert!(!is_reserved("block-0"));
    }

    #[test]
    fn test_community_names_free() {
        assert!(!is_reserved("my-button"));
        assert!(!is_reserved("fancy-card"));
        assert!(!is_reserved("buttons"));
    }

    #[test]
    fn test_entire_catalog_reserved() {
        for name in RESERVED_PRIMITIVES {
            assert!(is_reserved(name), "{name} should be reserved");
        }
        for &(prefix, max) in RESERVED_NUMBERED {
            for n in 1..=max {
                let name = format!("{prefix}-{n:02}");
                assert!(is_reserved(&name), "{name} should be reserved");
            }
        }
    }
}
