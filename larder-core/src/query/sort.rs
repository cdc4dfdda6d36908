use crate::types::Recipe;
use std::cmp::Ordering;
use utoipa::ToSchema;

/// Sort direction
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Descending (newest/highest first)
    #[default]
    Desc,
    /// Ascending (oldest/lowest first)
    Asc,
}

/// Column (or derived value) a listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Prep,
    Cook,
    /// Length of the instruction list; computed at query time
    InstructionCount,
    Published,
    Title,
}

/// Listing order requested by the client.
///
/// Every order ends with the recipe id ascending as a tie-break, so
/// repeated requests page through the same sequence.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ToSchema)]
#[schema(rename_all = "snake_case")]
pub enum SortKey {
    PrepAsc,
    PrepDesc,
    CookAsc,
    CookDesc,
    StepsAsc,
    StepsDesc,
    #[default]
    Newest,
    Oldest,
    NameAsc,
    NameDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 10] = [
        SortKey::PrepAsc,
        SortKey::PrepDesc,
        SortKey::CookAsc,
        SortKey::CookDesc,
        SortKey::StepsAsc,
        SortKey::StepsDesc,
        SortKey::Newest,
        SortKey::Oldest,
        SortKey::NameAsc,
        SortKey::NameDesc,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PrepAsc => "prep_asc",
            Self::PrepDesc => "prep_desc",
            Self::CookAsc => "cook_asc",
            Self::CookDesc => "cook_desc",
            Self::StepsAsc => "steps_asc",
            Self::StepsDesc => "steps_desc",
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::NameAsc => "name_asc",
            Self::NameDesc => "name_desc",
        }
    }

    /// Parse a client-supplied key. Unknown or missing keys fall back to
    /// [`SortKey::Newest`].
    pub fn from_str_lossy(s: Option<&str>) -> Self {
        let Some(s) = s.map(str::trim) else {
            return Self::default();
        };
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s))
            .unwrap_or_default()
    }

    pub const fn field(self) -> SortField {
        match self {
            Self::PrepAsc | Self::PrepDesc => SortField::Prep,
            Self::CookAsc | Self::CookDesc => SortField::Cook,
            Self::StepsAsc | Self::StepsDesc => SortField::InstructionCount,
            Self::Newest | Self::Oldest => SortField::Published,
            Self::NameAsc | Self::NameDesc => SortField::Title,
        }
    }

    pub const fn direction(self) -> Direction {
        match self {
            Self::PrepAsc | Self::CookAsc | Self::StepsAsc | Self::Oldest | Self::NameAsc => {
                Direction::Asc
            }
            Self::PrepDesc | Self::CookDesc | Self::StepsDesc | Self::Newest | Self::NameDesc => {
                Direction::Desc
            }
        }
    }

    /// Total order over recipes: primary field in the requested direction,
    /// then id ascending.
    pub fn compare(self, a: &Recipe, b: &Recipe) -> Ordering {
        let primary = match self.field() {
            SortField::Prep => a.prep.cmp(&b.prep),
            SortField::Cook => a.cook.cmp(&b.cook),
            SortField::InstructionCount => a.instruction_count().cmp(&b.instruction_count()),
            SortField::Published => a.published.cmp(&b.published),
            // Byte order, matching COLLATE "C" in the database
            SortField::Title => a.title.as_bytes().cmp(b.title.as_bytes()),
        };
        let primary = match self.direction() {
            Direction::Asc => primary,
            Direction::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn recipe(id: &str, title: &str, prep: i32, steps: usize, day: u32) -> Recipe {
        Recipe {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            prep,
            cook: 0,
            category: String::new(),
            servings: None,
            published: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
            tags: vec![],
            ingredients: Default::default(),
            instructions: (0..steps).map(|i| format!("step {}", i + 1)).collect(),
            images: vec![],
            nutrition: Default::default(),
        }
    }

    fn sorted_ids(key: SortKey, mut recipes: Vec<Recipe>) -> Vec<String> {
        recipes.sort_by(|a, b| key.compare(a, b));
        recipes.into_iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_parse_known_keys() {
        for key in SortKey::ALL {
            assert_eq!(SortKey::from_str_lossy(Some(key.as_str())), key);
        }
        assert_eq!(
            SortKey::from_str_lossy(Some("PREP_DESC")),
            SortKey::PrepDesc
        );
    }

    #[test]
    fn test_unknown_key_falls_back_to_newest() {
        assert_eq!(SortKey::from_str_lossy(None), SortKey::Newest);
        assert_eq!(SortKey::from_str_lossy(Some("rating")), SortKey::Newest);
        assert_eq!(SortKey::from_str_lossy(Some("")), SortKey::Newest);
    }

    #[test]
    fn test_prep_directions() {
        let recipes = vec![
            recipe("a", "A", 30, 1, 1),
            recipe("b", "B", 5, 1, 1),
            recipe("c", "C", 15, 1, 1),
        ];
        assert_eq!(
            sorted_ids(SortKey::PrepAsc, recipes.clone()),
            ["b", "c", "a"]
        );
        assert_eq!(sorted_ids(SortKey::PrepDesc, recipes), ["a", "c", "b"]);
    }

    #[test]
    fn test_steps_sort_uses_instruction_count() {
        let recipes = vec![
            recipe("a", "A", 0, 12, 1),
            recipe("b", "B", 0, 2, 1),
            recipe("c", "C", 0, 7, 1),
        ];
        assert_eq!(
            sorted_ids(SortKey::StepsAsc, recipes.clone()),
            ["b", "c", "a"]
        );
        assert_eq!(sorted_ids(SortKey::StepsDesc, recipes), ["a", "c", "b"]);
    }

    #[test]
    fn test_newest_and_oldest() {
        let recipes = vec![
            recipe("a", "A", 0, 0, 2),
            recipe("b", "B", 0, 0, 9),
            recipe("c", "C", 0, 0, 5),
        ];
        assert_eq!(
            sorted_ids(SortKey::Newest, recipes.clone()),
            ["b", "c", "a"]
        );
        assert_eq!(sorted_ids(SortKey::Oldest, recipes), ["a", "c", "b"]);
    }

    #[test]
    fn test_name_sort_is_bytewise() {
        let recipes = vec![
            recipe("a", "banana bread", 0, 0, 1),
            recipe("b", "Apple pie", 0, 0, 1),
            recipe("c", "Zucchini", 0, 0, 1),
        ];
        assert_eq!(
            sorted_ids(SortKey::NameAsc, recipes.clone()),
            ["b", "c", "a"]
        );
        assert_eq!(sorted_ids(SortKey::NameDesc, recipes), ["a", "c", "b"]);
    }

    #[test]
    fn test_ties_break_on_id_ascending_in_both_directions() {
        let recipes = vec![
            recipe("m", "Same", 10, 3, 4),
            recipe("c", "Same", 10, 3, 4),
            recipe("x", "Same", 10, 3, 4),
        ];
        for key in SortKey::ALL {
            assert_eq!(sorted_ids(key, recipes.clone()), ["c", "m", "x"], "{key:?}");
        }
    }
}
