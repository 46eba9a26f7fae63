/// Default word pool, used when no `WORD_LIST_PATH` is configured
pub(super) const WORDS: &[&str] = &[
    "animal", "alphabet", "awesome", "balloon", "basket", "birthday", "camera", "candle",
    "classroom", "coffee", "cookie", "creative", "dance", "dinosaur", "doorknob", "dream",
    "elephant", "emerald", "electric", "flowers", "follow", "frame", "funnel", "guitar",
    "grocery", "giggle", "haircut", "homemade", "honey", "hundred", "igloo", "invite",
    "journal", "jovial", "kangaroo", "keyboard", "kitchen", "landscape", "laugh", "lemon",
    "magazine", "marine", "meditate", "melody", "monument", "mountain", "music", "negotiate",
    "octopus", "opposite", "painting", "picnic", "pillow", "podcast", "puzzle", "recipe",
    "restaurant", "rewind", "secret", "spaceship", "stargazing", "sunrise", "together",
    "tourist", "travel", "unicorn", "uniform", "violin", "visitor", "walrus", "wander",
    "whirlwind", "xylophone", "yogurt", "zebra", "zigzag",
];
