use crate::analytics::keywords::KeywordCount;
use crate::analytics::sentiment::SentimentHistogram;

pub const FALLBACK: &str = "Keep monitoring submissions for emerging patterns.";

/// Aggregate figures the rules are evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub suggestion_count: usize,
    pub feedback_count: usize,
    pub sentiment: &'a SentimentHistogram,
    pub keywords: &'a [KeywordCount],
}

impl RuleInput<'_> {
    fn total(&self) -> usize {
        self.suggestion_count + self.feedback_count
    }
}

type Rule = fn(&RuleInput<'_>) -> Option<String>;

// Output order follows this table.
const RULES: [Rule; 5] = [
    suggestion_heavy,
    negative_outweighs_positive,
    overwhelmingly_positive,
    top_keyword,
    high_engagement,
];

fn suggestion_heavy(input: &RuleInput<'_>) -> Option<String> {
    (input.suggestion_count > input.feedback_count * 2).then(|| {
        "Users are very engaged with suggestions. Consider creating a suggestion voting system."
            .to_string()
    })
}

fn negative_outweighs_positive(input: &RuleInput<'_>) -> Option<String> {
    (input.sentiment.negative > input.sentiment.positive).then(|| {
        "There are concerning negative sentiments. Review recent submissions for urgent issues."
            .to_string()
    })
}

fn overwhelmingly_positive(input: &RuleInput<'_>) -> Option<String> {
    // positive / total > 0.7 without floating point
    (input.sentiment.positive * 10 > input.total() * 7).then(|| {
        "Overwhelmingly positive feedback! Consider highlighting success stories.".to_string()
    })
}

fn top_keyword(input: &RuleInput<'_>) -> Option<String> {
    input.keywords.first().map(|k| {
        format!(
            "\"{}\" appears frequently ({} times). This seems to be a key concern.",
            k.word, k.count
        )
    })
}

fn high_engagement(input: &RuleInput<'_>) -> Option<String> {
    (input.total() > 10).then(|| {
        "Great engagement! Consider implementing user authentication for better tracking."
            .to_string()
    })
}

pub fn recommend(input: &RuleInput<'_>) -> Vec<String> {
    let fired: Vec<String> = RULES.iter().filter_map(|rule| rule(input)).collect();
    if fired.is_empty() {
        vec![FALLBACK.to_string()]
    } else {
        fired
    }
}
