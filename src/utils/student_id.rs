use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// Mints a human-readable student identifier of the shape
/// `TTB_<school prefix>_<class prefix>_<random suffix>`, e.g. `TTB_GRE_10A_x4k2pq`.
/// The random suffix keeps ids unique; the prefixes make them legible to staff.
pub fn mint(school_name: &str, class_name: &str) -> String {
    let suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect();
    format!(
        "TTB_{}_{}_{}",
        prefix_of(school_name),
        prefix_of(class_name),
        suffix
    )
}

fn prefix_of(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(3)
        .collect();
    if cleaned.is_empty() {
        "XXX".to_string()
    } else {
        cleaned.to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minted_ids_carry_school_and_class_prefixes() {
        let id = mint("Green Valley High", "10A");
        assert!(id.starts_with("TTB_GRE_10A_"));
        assert_eq!(id.len(), "TTB_GRE_10A_".len() + 6);
    }

    #[test]
    fn short_and_empty_names_still_mint() {
        assert!(mint("Al", "9").starts_with("TTB_AL_9_"));
        assert!(mint("", "").starts_with("TTB_XXX_XXX_"));
    }

    #[test]
    fn ids_are_distinct() {
        let a = mint("School", "5B");
        let b = mint("School", "5B");
        assert_ne!(a, b);
    }
}
