//! Caption composer: header line, per-action templates, cute suffixes,
//! truncation.

use rand::Rng;
use rand::seq::IndexedRandom;

/// Hard cap on composed caption length.
pub const MAX_CAPTION: usize = 280;

/// Chance of appending a decorative suffix to the flavor line.
const SUFFIX_CHANCE: f64 = 0.35;

const SUFFIXES: &[&str] = &[
    "uwu", "owo", "nya~", ">w<", ".w.", "^_^", "♥", "💖", "✨", "｡◕‿◕｡",
];

/// Mood endings for the header line.
const ENDINGS: &[&str] = &["", ".-.", ">w<", ".w.", "owo", "uwu", "^_^", "._.", "-.-"];

/// If the template already contains one of these, skip the suffix so
/// the decoration doesn't double up.
const FLAVOR_STOPLIST: &[&str] = &["uwu", "owo", "nya", "♥", "💖", "✨"];

fn templates(action: &str) -> &'static [&'static str] {
    match action {
        "hug" => &[
            "{author} gives {target} the warmest hug ever.",
            "{author} hugs {target} tightly, like a cozy blanket.",
            "{author} wraps {target} in a giant fluffy hug.",
            "{author} holds {target} close and hums a tiny tune.",
            "{author} hugs {target} till the stars come out.",
        ],
        "slap" => &[
            "{author} slaps {target}, dramatic anime style!",
            "{author} gives {target} a light, comedic slap.",
            "{author} slaps {target} and everybody gasps.",
            "{author} performs the legendary slap technique on {target}.",
        ],
        "pat" => &[
            "{author} pats {target} on the head gently.",
            "{author} gives {target} a reassuring pat.",
            "{author} pats {target} with approval.",
            "{author} gives the sweetest little pat to {target}.",
        ],
        "kiss" => &[
            "{author} gives {target} a gentle kiss.",
            "{author} pecks {target} on the cheek.",
            "{author} steals a kiss from {target}!",
            "{author} kisses {target} under the stars.",
        ],
        "cuddle" => &[
            "{author} cuddles {target} like two marshmallows.",
            "{author} invites {target} for a cozy cuddle session.",
            "{author} snuggles {target} warmly.",
            "{author} and {target} cuddle and watch anime.",
        ],
        "bonk" => &[
            "{author} bonks {target} lightly on the head.",
            "{author} executes a comedic bonk on {target}.",
            "{author} bonks {target} with cartoon sound effects.",
        ],
        "boop" => &[
            "{author} boops {target} on the nose.",
            "{author} executes a perfect nose-boop on {target}.",
            "{author} boops {target} and giggles.",
        ],
        "tickle" => &[
            "{author} tickles {target} until they laugh.",
            "{author} tickles {target} and both giggle.",
            "{author} tickles {target} to cheer them up.",
        ],
        "stare" => &[
            "{author} stares at {target} intensely.",
            "{author} stares like it's a staring contest with {target}.",
            "{author} stares until {target} reacts.",
        ],
        "comfort" => &[
            "{author} comforts {target} with kind words.",
            "{author} sits with {target} and listens.",
            "{author} wraps {target} in a warm blanket of support.",
        ],
        _ => &[],
    }
}

/// Compose a caption for an action using the process RNG.
pub fn compose(action: &str, author: &str, target: &str) -> String {
    compose_with(&mut rand::rng(), action, author, target)
}

/// Compose with an explicit RNG so tests can seed it. The caption is
/// two lines: a plain header ("Alice hugs Bob" plus a mood ending)
/// above the flavored template line.
pub fn compose_with<R: Rng>(rng: &mut R, action: &str, author: &str, target: &str) -> String {
    let header = header_line(rng, action, author, target);
    let flavor = flavor_line(rng, action, author, target);
    truncate(&format!("{header}\n{flavor}"))
}

fn header_line<R: Rng>(rng: &mut R, action: &str, author: &str, target: &str) -> String {
    let ending = ENDINGS.choose(rng).copied().unwrap_or("");
    compact(&format!("{author} {action}s {target} {ending}"))
}

fn flavor_line<R: Rng>(rng: &mut R, action: &str, author: &str, target: &str) -> String {
    let pool = templates(action);
    let text = match pool.choose(rng) {
        Some(template) => template.replace("{author}", author).replace("{target}", target),
        None => format!("{author} {action}s {target}"),
    };

    let mut text = compact(&text);
    if rng.random_bool(SUFFIX_CHANCE)
        && !has_flavor(&text)
        && let Some(suffix) = SUFFIXES.choose(rng)
    {
        text = format!("{text} {suffix}");
    }
    text
}

fn compact(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn has_flavor(text: &str) -> bool {
    let lower = text.to_lowercase();
    FLAVOR_STOPLIST.iter().any(|token| lower.contains(token))
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_CAPTION {
        return text.to_string();
    }
    let mut out: String = text.chars().take(MAX_CAPTION - 3).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_known_action_substitutes_names() {
        let caption = compose_with(&mut rng(), "hug", "Alice", "Bob");
        assert!(caption.contains("Alice"));
        assert!(caption.contains("Bob"));
        assert!(!caption.contains("{author}"));
        assert!(!caption.contains("{target}"));
    }

    #[test]
    fn test_header_line_leads_the_caption() {
        let caption = compose_with(&mut rng(), "hug", "Alice", "Bob");
        assert_eq!(caption.lines().count(), 2, "caption: {caption}");
        let header = caption.lines().next().unwrap();
        assert!(header.starts_with("Alice hugs Bob"), "header: {header}");
    }

    #[test]
    fn test_unknown_action_uses_generic_lines() {
        let caption = compose_with(&mut rng(), "yeet", "Alice", "Bob");
        assert_eq!(caption.lines().count(), 2, "caption: {caption}");
        for line in caption.lines() {
            // Only an ending or a suffix may follow the generic form.
            assert!(line.starts_with("Alice yeets Bob"), "unexpected line: {line}");
        }
    }

    #[test]
    fn test_whitespace_is_normalized() {
        let caption = compose_with(&mut rng(), "yeet", "  Alice ", "Bob\t");
        assert!(!caption.contains("  "));
    }

    #[test]
    fn test_truncation() {
        let long_name = "x".repeat(400);
        let caption = compose_with(&mut rng(), "yeet", &long_name, "Bob");
        assert!(caption.chars().count() <= MAX_CAPTION);
        assert!(caption.ends_with("..."));
    }

    #[test]
    fn test_no_double_decoration() {
        // Run many compositions; a flavor line already containing a
        // flavor token must never pick up a second suffix.
        let mut r = rng();
        for _ in 0..200 {
            let caption = compose_with(&mut r, "hug", "Alice uwu", "Bob");
            let flavor = caption.lines().last().unwrap();
            let flavor_hits = ["uwu", "owo", "nya"]
                .iter()
                .map(|t| flavor.to_lowercase().matches(t).count())
                .sum::<usize>();
            assert!(flavor_hits <= 1, "double decoration in: {flavor}");
        }
    }

    #[test]
    fn test_suffix_appears_sometimes() {
        let mut r = rng();
        let mut with_suffix = 0;
        for _ in 0..300 {
            let caption = compose_with(&mut r, "yeet", "Alice", "Bob");
            if caption.lines().last().unwrap() != "Alice yeets Bob" {
                with_suffix += 1;
            }
        }
        assert!(with_suffix > 0, "suffix never applied");
        assert!(with_suffix < 300, "suffix always applied");
    }
}
