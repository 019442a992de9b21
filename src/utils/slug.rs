use uuid::Uuid;

/// Builds a public post slug from its title.
///
/// Non-alphanumeric characters collapse to dashes and a random suffix keeps
/// the slug unique even when titles collide.
pub fn slug_from_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    let base = cleaned.split_whitespace().collect::<Vec<_>>().join("-");

    let suffix = Uuid::new_v4().simple().to_string();
    if base.is_empty() {
        suffix[..12].to_string()
    } else {
        format!("{}-{}", base, &suffix[..12])
    }
}
