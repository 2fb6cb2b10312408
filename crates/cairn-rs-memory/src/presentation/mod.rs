//! Console rendering of memory results.

pub mod table;

use crate::model::{
    ContextOutcome, DeleteOutcome, ListOutcome, Owner, RetrieveOutcome, StoreOutcome,
};
pub use table::{Cell, Table, Tone, panel, preview};

/// Colour bands for similarity scores.
pub fn score_tone(score: f64) -> Tone {
    if score > 0.8 {
        Tone::Green
    } else if score > 0.5 {
        Tone::Yellow
    } else {
        Tone::Red
    }
}

fn short_id(id: &str) -> String {
    let head: String = id.chars().take(8).collect();
    format!("{head}...")
}

fn created(raw: &str) -> String {
    if raw.is_empty() {
        "Unknown".to_string()
    } else {
        raw.chars().take(19).collect()
    }
}

pub fn format_store_response(outcome: &StoreOutcome, content: &str) -> String {
    let mut table = Table::new(&["Operation", "Key", "Summary", "Category", "Keywords"])
        .tone(0, Tone::Green)
        .tone(1, Tone::Cyan)
        .tone(2, Tone::Yellow)
        .tone(3, Tone::Blue)
        .tone(4, Tone::Cyan);
    let (summary, category, keywords) = match &outcome.classification {
        Some(classification) => (
            classification.summary.as_str(),
            classification.category.as_str(),
            classification.keywords.join(", "),
        ),
        None => (content, "N/A", String::new()),
    };
    table.add_row(vec![
        "CREATED".into(),
        outcome.memory_key.as_str().into(),
        preview(summary, 100).into(),
        category.into(),
        keywords.into(),
    ]);
    panel("Memory Stored", &table.render(), Tone::Green)
}

pub fn format_retrieve_response(outcome: &RetrieveOutcome) -> String {
    if outcome.memories.is_empty() {
        return panel(
            "No Matches",
            "No memories found matching the query.",
            Tone::Yellow,
        );
    }
    let mut table = Table::new(&["ID", "Memory", "Score", "Category", "Created"])
        .tone(0, Tone::Cyan)
        .tone(1, Tone::Yellow)
        .tone(3, Tone::Blue);
    for hit in &outcome.memories {
        let category = hit
            .classification
            .as_ref()
            .map_or("N/A", |classification| classification.category.as_str());
        table.add_row(vec![
            short_id(&hit.id).into(),
            preview(&hit.memory, 80).into(),
            Cell::new(format!("{:.3}", hit.similarity), score_tone(hit.similarity)),
            category.into(),
            created(&hit.created_at).into(),
        ]);
    }
    panel("Search Results", &table.render(), Tone::Green)
}

pub fn format_list_response(outcome: &ListOutcome, owner: &Owner) -> String {
    if outcome.memories.is_empty() {
        return panel(
            "No Memories",
            &format!("No memories found for {owner}."),
            Tone::Yellow,
        );
    }
    let mut table = Table::new(&["ID", "Memory", "Category", "Created At"])
        .tone(0, Tone::Cyan)
        .tone(1, Tone::Yellow)
        .tone(2, Tone::Blue)
        .tone(3, Tone::Green);
    for memory in &outcome.memories {
        let category = memory
            .classification
            .as_ref()
            .map_or("N/A", |classification| classification.category.as_str());
        table.add_row(vec![
            short_id(&memory.id).into(),
            preview(&memory.memory, 100).into(),
            category.into(),
            created(&memory.created_at).into(),
        ]);
    }
    let mut body = table.render();
    if outcome.approximate {
        body.push_str("\nListing is similarity-based and may omit some memories.");
    }
    panel(
        &format!("Memories of {owner} ({})", outcome.total_found),
        &body,
        Tone::Green,
    )
}

pub fn format_delete_response(outcome: &DeleteOutcome) -> String {
    match outcome.existed {
        Some(false) => panel(
            "Nothing Deleted",
            &format!("🔑 Memory ID: {}\nNo memory with this key exists.", outcome.memory_key),
            Tone::Yellow,
        ),
        _ => panel(
            "Memory Deleted",
            &format!(
                "✅ Memory deleted successfully:\n🔑 Memory ID: {}",
                outcome.memory_key
            ),
            Tone::Green,
        ),
    }
}

pub fn format_context_response(outcome: &ContextOutcome) -> String {
    let mut body = outcome.summary.clone();
    if !outcome.context_memories.is_empty() {
        let mut table = Table::new(&["Score", "Memory", "Timestamp"]).tone(1, Tone::Yellow);
        for entry in &outcome.context_memories {
            table.add_row(vec![
                Cell::new(format!("{:.3}", entry.similarity), score_tone(entry.similarity)),
                preview(&entry.content, 80).into(),
                created(&entry.timestamp).into(),
            ]);
        }
        body = format!("{body}\n\n{}", table.render());
    }
    panel(
        &format!("Context ({})", outcome.total_context),
        &body,
        Tone::Blue,
    )
}

#[cfg(test)]
mod tests {
    use super::{format_delete_response, format_list_response, format_retrieve_response, score_tone};
    use crate::model::{DeleteOutcome, ListOutcome, ListedMemory, MemoryHit, Owner, RetrieveOutcome};
    use crate::presentation::Tone;
    use pretty_assertions::assert_eq;

    #[test]
    fn score_bands() {
        assert_eq!(score_tone(0.81), Tone::Green);
        assert_eq!(score_tone(0.8), Tone::Yellow);
        assert_eq!(score_tone(0.51), Tone::Yellow);
        assert_eq!(score_tone(0.5), Tone::Red);
    }

    #[test]
    fn retrieve_renders_scores_and_short_ids() {
        colored::control::set_override(false);
        let outcome = RetrieveOutcome {
            memories: vec![MemoryHit {
                id: "user123_20240501_103005_abcd1234".to_string(),
                memory: "User prefers vegetarian food".to_string(),
                similarity: 0.912,
                created_at: "2024-05-01T10:30:05.123456+00:00".to_string(),
                classification: None,
            }],
            total_found: 1,
            query: "food preferences".to_string(),
        };
        let rendered = format_retrieve_response(&outcome);
        assert!(rendered.contains("Search Results"));
        assert!(rendered.contains("user123_..."));
        assert!(rendered.contains("0.912"));
        assert!(rendered.contains("2024-05-01T10:30:05 "));
    }

    #[test]
    fn empty_results_use_notice_panels() {
        colored::control::set_override(false);
        let outcome = RetrieveOutcome {
            memories: Vec::new(),
            total_found: 0,
            query: "q".to_string(),
        };
        assert!(format_retrieve_response(&outcome).contains("No memories found matching the query."));
        let listing = ListOutcome {
            memories: Vec::new(),
            total_found: 0,
            approximate: true,
        };
        let rendered = format_list_response(&listing, &Owner::User("user456".to_string()));
        assert!(rendered.contains("No memories found for user user456."));
    }

    #[test]
    fn approximate_listing_is_flagged() {
        colored::control::set_override(false);
        let listing = ListOutcome {
            memories: vec![ListedMemory {
                id: "k1".to_string(),
                memory: "hello".to_string(),
                created_at: String::new(),
                updated_at: String::new(),
                classification: None,
            }],
            total_found: 1,
            approximate: true,
        };
        let rendered = format_list_response(&listing, &Owner::Agent("a1".to_string()));
        assert!(rendered.contains("may omit some memories"));
        assert!(rendered.contains("Unknown"));
    }

    #[test]
    fn delete_of_missing_key_says_so() {
        colored::control::set_override(false);
        let rendered = format_delete_response(&DeleteOutcome {
            memory_key: "k9".to_string(),
            message: String::new(),
            existed: Some(false),
        });
        assert!(rendered.contains("Nothing Deleted"));
        assert!(rendered.contains("k9"));
    }
}
