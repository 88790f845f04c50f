use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Science,
    Geography,
    History,
    PopCulture,
    Mathematics,
    Nature,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Science => "🔬 Science",
            Category::Geography => "🌍 Geography",
            Category::History => "📜 History",
            Category::PopCulture => "🎬 Pop Culture",
            Category::Mathematics => "🔢 Mathematics",
            Category::Nature => "🐾 Nature",
        };
        write!(f, "{}", label)
    }
}

/// A multiple-choice trivia question gating a card play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub options: [String; 4],
    /// Index into `options`.
    pub correct: usize,
    pub category: Category,
}

impl Question {
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct
    }

    pub fn correct_answer(&self) -> &str {
        &self.options[self.correct]
    }
}

type Entry = (&'static str, [&'static str; 4], usize, Category);

const CATALOG: &[Entry] = &[
    // Science
    ("What is the most abundant chemical element in the universe?", ["Oxygen", "Hydrogen", "Carbon", "Nitrogen"], 1, Category::Science),
    ("How many planets are in the Solar System?", ["7", "8", "9", "10"], 1, Category::Science),
    ("Which gas do plants absorb during photosynthesis?", ["Oxygen", "Nitrogen", "Carbon dioxide", "Hydrogen"], 2, Category::Science),
    ("How many bones are in the adult human body?", ["206", "208", "210", "204"], 0, Category::Science),
    ("Roughly how fast does light travel in a vacuum?", ["300,000 km/s", "150,000 km/s", "450,000 km/s", "250,000 km/s"], 0, Category::Science),
    ("Which planet is known as the Red Planet?", ["Venus", "Jupiter", "Mars", "Saturn"], 2, Category::Science),
    ("What is the largest organ of the human body?", ["Liver", "Lung", "Skin", "Intestine"], 2, Category::Science),
    ("What is the chemical symbol for gold?", ["Go", "Gd", "Au", "Ag"], 2, Category::Science),
    ("In which part of the cell is most DNA found?", ["Membrane", "Nucleus", "Ribosome", "Cytoplasm"], 1, Category::Science),
    ("Which is the hottest planet in the Solar System?", ["Mercury", "Venus", "Mars", "Jupiter"], 1, Category::Science),
    // Geography
    ("What is the capital of Australia?", ["Sydney", "Melbourne", "Canberra", "Perth"], 2, Category::Geography),
    ("Which is the largest country by area?", ["China", "Canada", "Brazil", "Russia"], 3, Category::Geography),
    ("Which is the largest ocean on Earth?", ["Atlantic", "Indian", "Arctic", "Pacific"], 3, Category::Geography),
    ("Which river is traditionally considered the longest?", ["Amazon", "Nile", "Yangtze", "Mississippi"], 1, Category::Geography),
    ("What is the highest mountain above sea level?", ["K2", "Everest", "Aconcagua", "Kilimanjaro"], 1, Category::Geography),
    ("On which continent is Egypt?", ["Asia", "Europe", "Africa", "Oceania"], 2, Category::Geography),
    ("What is the capital of Argentina?", ["Córdoba", "Rosario", "Buenos Aires", "Mendoza"], 2, Category::Geography),
    ("What is the smallest country in the world?", ["Monaco", "San Marino", "Vatican City", "Liechtenstein"], 2, Category::Geography),
    ("Which is the largest hot desert?", ["Gobi", "Atacama", "Sahara", "Namib"], 2, Category::Geography),
    ("Which country has the most time zones?", ["Russia", "USA", "France", "China"], 2, Category::Geography),
    // History
    ("In which year did the Second World War end?", ["1918", "1945", "1939", "1950"], 1, Category::History),
    ("Who was the first President of the United States?", ["Thomas Jefferson", "Abraham Lincoln", "George Washington", "John Adams"], 2, Category::History),
    ("In which year did humans first land on the Moon?", ["1967", "1968", "1969", "1970"], 2, Category::History),
    ("For which pharaoh was the Great Pyramid of Giza built?", ["Tutankhamun", "Cleopatra", "Khufu", "Ramesses II"], 2, Category::History),
    ("When did the French Revolution begin?", ["1776", "1789", "1799", "1804"], 1, Category::History),
    ("In which country did the Industrial Revolution begin?", ["France", "Germany", "USA", "Great Britain"], 3, Category::History),
    ("Which empire built Machu Picchu?", ["Aztec", "Maya", "Inca", "Olmec"], 2, Category::History),
    ("In which year did the Berlin Wall fall?", ["1987", "1989", "1991", "1993"], 1, Category::History),
    // Pop culture
    ("Which band recorded \"Bohemian Rhapsody\"?", ["The Beatles", "Led Zeppelin", "Queen", "The Rolling Stones"], 2, Category::PopCulture),
    ("In which city is the Eiffel Tower?", ["Lyon", "Marseille", "Paris", "Bordeaux"], 2, Category::PopCulture),
    ("Who painted the Mona Lisa?", ["Michelangelo", "Raphael", "Leonardo da Vinci", "Caravaggio"], 2, Category::PopCulture),
    ("Which wizard school does Harry Potter attend?", ["Durmstrang", "Hogwarts", "Beauxbatons", "Ilvermorny"], 1, Category::PopCulture),
    ("How many colours are in a rainbow?", ["5", "6", "7", "8"], 2, Category::PopCulture),
    ("Which video game features a plumber named Mario?", ["Sonic", "Super Mario Bros.", "Zelda", "Pac-Man"], 1, Category::PopCulture),
    ("Which instrument has 88 keys?", ["Organ", "Accordion", "Piano", "Harpsichord"], 2, Category::PopCulture),
    ("How many players does a football (soccer) team field?", ["9", "10", "11", "12"], 2, Category::PopCulture),
    // Mathematics
    ("What is 7 × 8?", ["54", "56", "58", "63"], 1, Category::Mathematics),
    ("What is the square root of 144?", ["11", "12", "13", "14"], 1, Category::Mathematics),
    ("What is 25% of 200?", ["40", "45", "50", "55"], 2, Category::Mathematics),
    ("Which is the best approximation of pi?", ["3.14", "3.16", "3.12", "3.18"], 0, Category::Mathematics),
    ("What is 2 to the power of 10?", ["512", "1024", "2048", "256"], 1, Category::Mathematics),
    ("How many sides does a hexagon have?", ["5", "6", "7", "8"], 1, Category::Mathematics),
    ("What is the next prime number after 11?", ["12", "13", "14", "15"], 1, Category::Mathematics),
    ("What is 15% of 300?", ["40", "42", "45", "50"], 2, Category::Mathematics),
    // Nature
    ("What is the fastest land animal?", ["Cheetah", "Pronghorn", "Lion", "Greyhound"], 0, Category::Nature),
    ("What is the largest animal ever known?", ["African elephant", "Whale shark", "Blue whale", "Giraffe"], 2, Category::Nature),
    ("How many legs does a spider have?", ["6", "7", "8", "10"], 2, Category::Nature),
    ("Which is the only mammal capable of true flight?", ["Platypus", "Bat", "Flying squirrel", "Sugar glider"], 1, Category::Nature),
    ("Which tree produces acorns?", ["Pine", "Oak", "Maple", "Chestnut"], 1, Category::Nature),
];

/// Returns the full, fixed trivia catalog.
pub fn all_questions() -> Vec<Arc<Question>> {
    CATALOG
        .iter()
        .map(|(text, options, correct, category)| {
            Arc::new(Question {
                text: text.to_string(),
                options: options.map(str::to_string),
                correct: *correct,
                category: *category,
            })
        })
        .collect()
}
