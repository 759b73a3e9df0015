/// One scroll-triggered prose block. Each step is tied to exactly one cell
/// in the graphic panel by its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrativeStep {
    pub title: &'static str,
    pub body: &'static str,
}

pub const STEPS: [NarrativeStep; 7] = [
    NarrativeStep {
        title: "Six months of Spanish",
        body: "Last winter I started drilling Spanish vocabulary with spaced-repetition \
               flashcards. Every card asks for one word; every answer is logged. This page \
               walks through the half year of review history that piled up, one question \
               at a time.",
    },
    NarrativeStep {
        title: "What a review looks like",
        body: "Each row in the log is a single review: the word, when it happened, whether \
               I got it right, and how long I stared before answering. Ninety-six distinct \
               words accumulated 785 of these reviews between February and August. The log \
               also notes whether I agreed with the scheduler's choice of next interval.",
    },
    NarrativeStep {
        title: "The collection, week by week",
        body: "New words did not arrive at a steady pace. Step through the milestones to \
               watch the collection grow, grouped by the category each word was filed \
               under. A February burst, a food-heavy March, and a quiet vacation gap are \
               all visible in the order the tiles appear.",
    },
    NarrativeStep {
        title: "What kind of words?",
        body: "Stacking every distinct word into one bar hides its composition. Advance \
               the phases to split the bar by part of speech, then spread it out, then \
               single out the nouns, which dominate the collection by a wide margin over \
               the mean.",
    },
    NarrativeStep {
        title: "How well do they stick?",
        body: "Every word earns a success rate from its good and failed reviews. Each dot \
               below is one word, stacked into five-point buckets. Toggle the categories \
               to see which shelves of vocabulary hold up and which keep slipping. Words \
               that were never graded stay out of the picture entirely.",
    },
    NarrativeStep {
        title: "When did I study?",
        body: "Six calendar months, one cell per day, darker where more reviews landed. \
               Click any active day to drill into its hours, and cycle the detail view \
               between outcomes, scheduler agreement, and how long each answer took. \
               Reset climbs back out to the calendar.",
    },
    NarrativeStep {
        title: "Where this goes",
        body: "Six months in, the streak matters more than any single chart. The pile of \
               reviews keeps growing by a handful a day, and the words that survived \
               February are mostly instant now. Ask me again in another six months.",
    },
];

/// Step indices that show a painted title card rather than a chart.
pub const CARD_STEPS: [usize; 3] = [0, 1, 6];
