use std::collections::HashMap;

use chrono::NaiveDate;
use regex::Regex;
use tracing::{
    info,
    warn,
};

use crate::core::{
    errors::RepasoError,
    models::{
        Category,
        Outcome,
        Pos,
        ReviewRecord,
        WordAggregate,
    },
};

/// Review log shipped with the binary; used until the user opens their own.
pub const BUNDLED_CSV: &str = include_str!("../../assets/data/reviews.csv");

const EXPECTED_HEADER: &str = "word,translation,pos,category,day,tod,outcome,agree,secs";

/// The loaded review history plus the rollups every chart starts from.
pub struct Dataset {
    pub records: Vec<ReviewRecord>,
    /// Unfiltered per-word rollups in first-seen order.
    pub words: Vec<WordAggregate>,
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    pub skipped_rows: usize,
}

impl Dataset {
    pub fn from_csv(text: &str) -> Result<Dataset, RepasoError> {
        let mut lines = text.lines();

        let header = lines.next().unwrap_or("").trim();
        if header != EXPECTED_HEADER {
            return Err(RepasoError::BadHeader {
                expected: EXPECTED_HEADER.to_string(),
                found: header.to_string(),
            });
        }

        let tag_re = Regex::new(r"<[^>]*>")?;

        let mut records = Vec::new();
        let mut skipped = 0usize;

        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            match parse_row(line, &tag_re) {
                Some(record) => records.push(record),
                None => skipped += 1,
            }
        }

        if records.is_empty() {
            return Err(RepasoError::EmptyDataset);
        }

        if skipped > 0 {
            warn!(skipped, "discarded rows with unusable identity fields");
        }

        let min_day = records.iter().map(|r| r.day).min().unwrap_or(0);
        let max_day = records.iter().map(|r| r.day).max().unwrap_or(0);
        let epoch = crate::config::collection_epoch();

        let words = aggregate_words(&records, |_| true);

        info!(records = records.len(), words = words.len(), skipped, "review history loaded");

        Ok(Dataset {
            records,
            words,
            min_date: epoch + chrono::Days::new(min_day as u64),
            max_date: epoch + chrono::Days::new(max_day as u64),
            skipped_rows: skipped,
        })
    }

    pub fn daily_counts(&self) -> HashMap<NaiveDate, usize> {
        let mut counts = HashMap::new();
        for record in &self.records {
            *counts.entry(record.date()).or_insert(0) += 1;
        }
        counts
    }

    pub fn records_on(&self, date: NaiveDate) -> Vec<&ReviewRecord> {
        self.records.iter().filter(|r| r.date() == date).collect()
    }
}

/// Rolls records up per word, keeping only records the filter accepts.
/// Output order is first-occurrence order within the accepted records,
/// which downstream layouts rely on as the tie-break.
pub fn aggregate_words<F>(records: &[ReviewRecord], filter: F) -> Vec<WordAggregate>
where
    F: Fn(&ReviewRecord) -> bool,
{
    let mut words: Vec<WordAggregate> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (record_index, record) in records.iter().enumerate() {
        if !filter(record) {
            continue;
        }

        let slot = match index.get(record.word.as_str()) {
            Some(&slot) => slot,
            None => {
                index.insert(record.word.clone(), words.len());
                words.push(WordAggregate {
                    word: record.word.clone(),
                    translation: record.translation.clone(),
                    pos: record.pos,
                    category: record.category,
                    first_day: record.day,
                    first_index: record_index,
                    successes: 0,
                    failures: 0,
                });
                words.len() - 1
            }
        };

        let aggregate = &mut words[slot];
        aggregate.first_day = aggregate.first_day.min(record.day);
        match record.outcome {
            Some(Outcome::Good) => aggregate.successes += 1,
            Some(Outcome::Again) => aggregate.failures += 1,
            None => {}
        }
    }

    words
}

fn parse_row(line: &str, tag_re: &Regex) -> Option<ReviewRecord> {
    let fields = split_csv_line(line);
    if fields.len() != 9 {
        return None;
    }

    let word = fields[0].trim();
    if word.is_empty() {
        return None;
    }

    let translation = strip_markup(fields[1].trim(), tag_re);
    let pos = Pos::from_code(fields[2].trim())?;
    let category = Category::from_code(fields[3].trim())?;
    let day: u32 = fields[4].trim().parse().ok()?;
    let tod_secs: u32 = fields[5].trim().parse().ok()?;
    if tod_secs >= 86_400 {
        return None;
    }

    // Trailing fields are best-effort: a blank or garbled value excludes the
    // field from aggregates without losing the review itself.
    let outcome = Outcome::from_code(fields[6].trim());
    let agreed = match fields[7].trim() {
        "y" => Some(true),
        "n" => Some(false),
        _ => None,
    };
    let duration_secs = fields[8].trim().parse::<f32>().ok().filter(|s| s.is_finite() && *s > 0.0);

    Some(ReviewRecord {
        word: word.to_string(),
        translation,
        pos,
        category,
        day,
        tod_secs,
        outcome,
        agreed,
        duration_secs,
    })
}

/// Splits one CSV line, honoring double-quoted fields with `""` escapes.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    fields.push(current);

    fields
}

/// Drops flashcard HTML remnants and decodes the entities Anki exports leave
/// behind, then normalizes runs of whitespace.
fn strip_markup(text: &str, tag_re: &Regex) -> String {
    let without_tags = tag_re.replace_all(text, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
word,translation,pos,category,day,tod,outcome,agree,secs
la casa,house,noun,everyday,0,27000,good,y,4.2
la casa,house,noun,everyday,2,27100,again,n,9.0
probar,\"to try, to taste<br>\",verb,food,1,76000,good,y,6.1
chatear,to chat online,verb,loan,3,76500,,,
";

    #[test]
    fn parses_rows_and_aggregates() {
        let dataset = Dataset::from_csv(SAMPLE).unwrap();
        assert_eq!(dataset.records.len(), 4);
        assert_eq!(dataset.skipped_rows, 0);
        assert_eq!(dataset.words.len(), 3);

        let casa = &dataset.words[0];
        assert_eq!(casa.word, "la casa");
        assert_eq!(casa.successes, 1);
        assert_eq!(casa.failures, 1);
        assert_eq!(casa.first_day, 0);
        assert_eq!(casa.success_rate(), Some(50.0));

        // Quoted field with an embedded comma, markup stripped.
        assert_eq!(dataset.words[1].translation, "to try, to taste");

        // Ungraded word: kept, but its rate is undefined.
        assert_eq!(dataset.words[2].success_rate(), None);
    }

    #[test]
    fn malformed_optional_fields_keep_the_row() {
        let text = "\
word,translation,pos,category,day,tod,outcome,agree,secs
el pan,bread,noun,food,4,30000,banana,maybe,fast
";
        let dataset = Dataset::from_csv(text).unwrap();
        assert_eq!(dataset.records.len(), 1);
        assert_eq!(dataset.skipped_rows, 0);

        let record = &dataset.records[0];
        assert_eq!(record.outcome, None);
        assert_eq!(record.agreed, None);
        assert_eq!(record.duration_secs, None);
    }

    #[test]
    fn malformed_identity_fields_drop_the_row() {
        let text = "\
word,translation,pos,category,day,tod,outcome,agree,secs
el pan,bread,noun,food,4,30000,good,y,3.0
el pan,bread,gerund,food,5,30000,good,y,3.0
el pan,bread,noun,food,notaday,30000,good,y,3.0
el pan,bread,noun,food,6,99999,good,y,3.0
";
        let dataset = Dataset::from_csv(text).unwrap();
        assert_eq!(dataset.records.len(), 1);
        assert_eq!(dataset.skipped_rows, 3);
    }

    #[test]
    fn rejects_unknown_header_and_empty_input() {
        assert!(matches!(
            Dataset::from_csv("palabra;traduccion\n"),
            Err(RepasoError::BadHeader { .. })
        ));
        assert!(matches!(
            Dataset::from_csv("word,translation,pos,category,day,tod,outcome,agree,secs\n"),
            Err(RepasoError::EmptyDataset)
        ));
    }

    #[test]
    fn filtered_aggregation_matches_category_rollup() {
        let text = "\
word,translation,pos,category,day,tod,outcome,agree,secs
uno,one,noun,food,0,1000,good,y,2.0
dos,two,noun,food,1,1000,again,y,2.0
tres,three,noun,travel,2,1000,good,y,2.0
";
        let dataset = Dataset::from_csv(text).unwrap();

        let food = aggregate_words(&dataset.records, |r| r.category == Category::Food);
        assert_eq!(food.len(), 2);
        assert_eq!(food.iter().map(|w| w.successes).sum::<u32>(), 1);
        assert_eq!(food.iter().map(|w| w.failures).sum::<u32>(), 1);

        let travel = aggregate_words(&dataset.records, |r| r.category == Category::Travel);
        assert_eq!(travel.len(), 1);
        assert_eq!(travel[0].success_rate(), Some(100.0));
    }

    #[test]
    fn first_seen_order_is_stable_under_filters() {
        let text = "\
word,translation,pos,category,day,tod,outcome,agree,secs
b,two,noun,food,0,2000,good,y,2.0
a,one,noun,food,0,1000,good,y,2.0
b,two,noun,food,1,2000,good,y,2.0
";
        let dataset = Dataset::from_csv(text).unwrap();
        let order: Vec<&str> = dataset.words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(order, ["b", "a"]);
    }

    #[test]
    fn bundled_dataset_loads_cleanly() {
        let dataset = Dataset::from_csv(BUNDLED_CSV).unwrap();
        assert_eq!(dataset.skipped_rows, 0);
        assert_eq!(dataset.words.len(), 96);
        assert!(dataset.min_date < dataset.max_date);
    }

    #[test]
    fn daily_counts_sum_to_record_count() {
        let dataset = Dataset::from_csv(SAMPLE).unwrap();
        let counts = dataset.daily_counts();
        assert_eq!(counts.values().sum::<usize>(), dataset.records.len());
        assert_eq!(dataset.records_on(dataset.records[0].date()).len(), 1);
    }
}
