//! Bundled fallback media and flair tables.
//!
//! These are the last two tiers of media resolution: a curated per-action
//! GIF list, and a small generic pool used when an action has nothing of
//! its own. Also holds the flair-reaction emoji pairs (restricted to the
//! emoji Telegram accepts as message reactions) and the help categories.

/// Every action the bot ships with. Unknown tokens can still become
/// actions at runtime, these just get listed and get fallback media.
pub const BUILTIN_ACTIONS: &[&str] = &[
    "hug", "slap", "pat", "kiss", "cuddle", "boop", "highfive", "poke", "bite", "tickle",
    "punch", "kick", "dance", "cry", "blush", "wave", "bonk", "stare", "laugh", "smug",
    "sleep", "holdhands", "feed", "throw", "run", "scared", "comfort", "tease",
];

/// Shared pool used when an action has no curated list of its own.
pub const GENERIC_FALLBACK: &[&str] = &[
    "https://media.giphy.com/media/ASd0Ukj0y3qMM/giphy.gif",
    "https://media.giphy.com/media/11sBLVxNs7v6WA/giphy.gif",
    "https://media.giphy.com/media/3o7aD2saalBwwftBIY/giphy.gif",
    "https://media.giphy.com/media/xT0xeJpnrWC4XWblEk/giphy.gif",
    "https://media.giphy.com/media/3oEduSbSGpGaRX2Vri/giphy.gif",
];

/// Curated per-action fallback GIFs. Not every action has one; the
/// generic pool covers the rest.
pub fn fallback_urls(action: &str) -> &'static [&'static str] {
    match action {
        "hug" => &[
            "https://media.giphy.com/media/l2QDM9Jnim1YVILXa/giphy.gif",
            "https://media.giphy.com/media/od5H3PmEG5EVq/giphy.gif",
            "https://media.giphy.com/media/143v0Z4767T15e/giphy.gif",
            "https://media.giphy.com/media/sUIZWMnfd4Mb6/giphy.gif",
            "https://media.giphy.com/media/49mdjsMrH7oze/giphy.gif",
        ],
        "slap" => &[
            "https://media.giphy.com/media/Gf3AUz3eBNbTW/giphy.gif",
            "https://media.giphy.com/media/jLeyZWgtwgr2U/giphy.gif",
            "https://media.giphy.com/media/Zau0yrl17uzdK/giphy.gif",
            "https://media.giphy.com/media/fO6UtDy5pWYwM/giphy.gif",
        ],
        "pat" => &[
            "https://media.giphy.com/media/109ltuoSQT212w/giphy.gif",
            "https://media.giphy.com/media/4HP0ddZnNVvKU/giphy.gif",
            "https://media.giphy.com/media/osYdfUptPqV0s/giphy.gif",
            "https://media.giphy.com/media/ArLxZ4PebH2Ug/giphy.gif",
        ],
        "kiss" => &[
            "https://media.giphy.com/media/G3va31oEEnIkM/giphy.gif",
            "https://media.giphy.com/media/FqBTvSNjNzeZG/giphy.gif",
            "https://media.giphy.com/media/bGm9FuBCGg4SY/giphy.gif",
        ],
        "cuddle" => &[
            "https://media.giphy.com/media/3oriO0OEd9QIDdllqo/giphy.gif",
            "https://media.giphy.com/media/3Z1Yj0iXySA2o/giphy.gif",
            "https://media.giphy.com/media/QGc8RgR0J5Na/giphy.gif",
        ],
        "bonk" => &[
            "https://media.giphy.com/media/j3iGKfXRKlLqw/giphy.gif",
            "https://media.giphy.com/media/MWSRkVoNaC30A/giphy.gif",
        ],
        "cry" => &[
            "https://media.giphy.com/media/d2lcHJTG5Tscg/giphy.gif",
            "https://media.giphy.com/media/ROF8OQvDmxytW/giphy.gif",
            "https://media.giphy.com/media/26gssIytJvy1b1THO/giphy.gif",
        ],
        "dance" => &[
            "https://media.giphy.com/media/3oriO7A7bt1wsEP4cw/giphy.gif",
            "https://media.giphy.com/media/l41YtZOb9EUABnuqA/giphy.gif",
            "https://media.giphy.com/media/5PhDdJfLt4FXe/giphy.gif",
        ],
        "stare" => &[
            "https://media.giphy.com/media/XreQmk7ETCak0/giphy.gif",
            "https://media.giphy.com/media/3o7btYFgbkD2MPkzVu/giphy.gif",
        ],
        "smug" => &[
            "https://media.giphy.com/media/3o7btNR05vVYlfaU6Y/giphy.gif",
            "https://media.giphy.com/media/VbnUQpnihPSIgIXuZv/giphy.gif",
        ],
        _ => &[],
    }
}

/// Flair reactions attached to the triggering message after the first
/// successful step. Telegram only allows a fixed emoji set for message
/// reactions, so these are mapped into that set.
pub fn flair_reactions(action: &str) -> (&'static str, &'static str) {
    match action {
        "hug" | "cuddle" | "holdhands" | "comfort" => ("🥰", "❤"),
        "kiss" | "blush" => ("😍", "❤"),
        "slap" | "punch" | "kick" | "bonk" | "throw" => ("😱", "🔥"),
        "pat" | "boop" | "feed" => ("🥰", "👌"),
        "laugh" | "tickle" | "tease" | "smug" => ("😁", "🤡"),
        "dance" | "highfive" | "wave" | "run" => ("🎉", "👏"),
        "cry" | "scared" => ("😢", "🙏"),
        "sleep" => ("🥱", "👌"),
        _ => ("👍", "❤"),
    }
}

/// Help listing groups, in display order.
pub fn category_groups() -> [(&'static str, &'static [&'static str]); 4] {
    [
        ("🤝 Cute / Soft", &["hug", "pat", "cuddle", "kiss", "holdhands", "comfort", "feed", "boop"]),
        ("⚔️ Action / Battle", &["slap", "punch", "kick", "bonk", "bite", "throw", "run"]),
        ("🎭 Playful / Fun", &["tickle", "tease", "poke", "highfive", "laugh", "dance", "smug"]),
        ("😳 Emotional / Mood", &["cry", "blush", "wave", "stare", "scared", "sleep"]),
    ]
}
