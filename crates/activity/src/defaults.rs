/// Built-in activity list, one per day of the season.
pub const DEFAULT_ACTIVITIES: [&str; 25] = [
    "Drink hot cocoa with marshmallows",
    "Sing a Christmas carol",
    "Bake Christmas cookies",
    "Watch a holiday movie",
    "Make paper snowflakes",
    "Read a Christmas story",
    "Write a letter to Santa",
    "Decorate the Christmas tree",
    "Make homemade ornaments",
    "Light a festive candle",
    "Go caroling in the neighborhood",
    "Make a gingerbread house",
    "String popcorn garland",
    "Donate to a local charity",
    "Make holiday cards",
    "Have a snowball fight",
    "Build a snowman",
    "Go ice skating",
    "Visit a Christmas market",
    "Wrap presents with festive paper",
    "Look at Christmas lights",
    "Roast chestnuts",
    "Make a advent wreath",
    "Listen to Christmas music",
    "Have a cozy movie marathon",
];

pub const DEFAULT_START_DATE: &str = "2024-12-01";

pub fn default_activities() -> Vec<String> {
    DEFAULT_ACTIVITIES.iter().map(|a| a.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_texts_are_kept_as_stored() {
        assert_eq!(DEFAULT_ACTIVITIES[0], "Drink hot cocoa with marshmallows");
        assert_eq!(DEFAULT_ACTIVITIES[22], "Make a advent wreath");
        assert_eq!(DEFAULT_ACTIVITIES[24], "Have a cozy movie marathon");
        assert_eq!(default_activities().len(), 25);
    }
}
