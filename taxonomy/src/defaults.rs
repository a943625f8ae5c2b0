//! The built-in emotion wheel.
//!
//! Seven main emotions, each subdivided into four mid-categories of three leaf
//! emotions. Leaf names are unique across the whole tree.

use crate::tree::EmotionTaxonomy;
use crate::types::MainEmotion;

/// Build the default seven-main emotion wheel.
pub fn default_wheel() -> EmotionTaxonomy {
    let mains = vec![
        MainEmotion::new(
            "happy",
            [
                ("playful", ["amused", "cheeky", "mischievous"]),
                ("content", ["blissful", "peaceful", "satisfied"]),
                ("proud", ["confident", "successful", "valued"]),
                ("optimistic", ["inspired", "hopeful", "eager"]),
            ],
        ),
        MainEmotion::new(
            "sad",
            [
                ("grief", ["sorrow", "mourning", "anguished"]),
                ("lonely", ["isolated", "abandoned", "excluded"]),
                ("despair", ["depressed", "powerless", "empty"]),
                ("hurt", ["disappointed", "fragile", "victimized"]),
            ],
        ),
        MainEmotion::new(
            "angry",
            [
                ("frustrated", ["annoyed", "irritated", "exasperated"]),
                ("enraged", ["furious", "infuriated", "livid"]),
                ("resentful", ["jealous", "indignant", "betrayed"]),
                ("distant", ["withdrawn", "numb", "dismissive"]),
            ],
        ),
        MainEmotion::new(
            "surprised",
            [
                ("amazed", ["awe", "astonished", "dazzled"]),
                ("shocked", ["dismayed", "disillusioned", "startled"]),
                ("confused", ["perplexed", "bewildered", "disoriented"]),
                ("excited", ["energetic", "thrilled", "giddy"]),
            ],
        ),
        MainEmotion::new(
            "disgusted",
            [
                ("disapproving", ["judgemental", "embarrassed", "ashamed"]),
                ("repelled", ["revolted", "nauseated", "detestable"]),
                ("awful", ["appalled", "horrified", "repulsed"]),
                ("critical", ["skeptical", "contempt", "aversion"]),
            ],
        ),
        MainEmotion::new(
            "fearful",
            [
                ("anxious", ["worried", "overwhelmed", "rushed"]),
                ("insecure", ["inadequate", "inferior", "worthless"]),
                ("scared", ["frightened", "terrified", "helpless"]),
                ("threatened", ["nervous", "exposed", "persecuted"]),
            ],
        ),
        MainEmotion::new(
            "tired",
            [
                ("sleepy", ["drowsy", "lethargic", "groggy"]),
                ("drained", ["exhausted", "fatigued", "depleted"]),
                ("unfocused", ["distracted", "apathetic", "indifferent"]),
                ("weary", ["listless", "burned-out", "jaded"]),
            ],
        ),
    ];

    // The built-in tree satisfies the uniqueness invariants by construction.
    EmotionTaxonomy::new(mains).expect("default emotion wheel is valid")
}

impl Default for EmotionTaxonomy {
    fn default() -> Self {
        default_wheel()
    }
}
