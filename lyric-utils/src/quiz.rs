//! Vocabulary quiz generated from the frequency table.
//!
//! Each item starts `Unanswered` and becomes `Answered` exactly once; there
//! is no re-attempt. Scoring gives each item `100 / N` points, and a total of
//! 60 or more selects the advanced feedback branch.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::{PartOfSpeech, WordCount};

/// Score at or above which the advanced study advice is shown.
pub const PASS_THRESHOLD: u32 = 60;

/// Number of items in a full quiz. Thin vocabularies produce fewer items.
pub const QUIZ_SIZE: usize = 5;

/// Filler distractors for inputs whose vocabulary is too small to derive
/// plausible wrong answers from. Four entries, so the leader item reaches
/// four options even when the leader equals one of them.
const FIXED_DISTRACTORS: [&str; 4] = ["노래", "바람", "행복", "추억"];

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, Eq, PartialEq)]
pub enum QuizAnswer {
    Unanswered,
    Answered { choice: String, correct: bool },
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, Eq, PartialEq)]
pub struct QuizItem {
    pub question: String,
    pub correct_answer: String,
    pub options: Vec<String>,
    pub answer: QuizAnswer,
}

impl QuizItem {
    fn new(question: String, correct_answer: String, options: Vec<String>) -> Self {
        debug_assert!(options.contains(&correct_answer));
        Self {
            question,
            correct_answer,
            options,
            answer: QuizAnswer::Unanswered,
        }
    }
}

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum QuizError {
    #[error("no quiz item at index {0}")]
    NoSuchItem(usize),
    #[error("quiz item {0} was already answered")]
    AlreadyAnswered(usize),
    #[error("'{choice}' is not an option of quiz item {item}")]
    UnknownOption { item: usize, choice: String },
}

#[derive(Clone, Debug, serde::Serialize, Eq, PartialEq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub score: u32,
    pub answered: usize,
    pub total: usize,
    pub complete: bool,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize, Eq, PartialEq)]
pub struct Quiz {
    items: Vec<QuizItem>,
}

impl Quiz {
    pub fn items(&self) -> &[QuizItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn answered(&self) -> usize {
        self.items
            .iter()
            .filter(|item| !matches!(item.answer, QuizAnswer::Unanswered))
            .count()
    }

    pub fn is_complete(&self) -> bool {
        !self.items.is_empty() && self.answered() == self.items.len()
    }

    /// Correct answers times `100 / N`, so a full five-item quiz is worth 20
    /// points per item and a three-item quiz 33.
    pub fn score(&self) -> u32 {
        if self.items.is_empty() {
            return 0;
        }
        let correct = self
            .items
            .iter()
            .filter(|item| matches!(item.answer, QuizAnswer::Answered { correct: true, .. }))
            .count() as u32;
        correct * 100 / self.items.len() as u32
    }

    /// Record the user's choice for one item. Answering is terminal.
    pub fn answer(&mut self, index: usize, choice: &str) -> Result<AnswerOutcome, QuizError> {
        let total = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(QuizError::NoSuchItem(index))?;
        if !matches!(item.answer, QuizAnswer::Unanswered) {
            return Err(QuizError::AlreadyAnswered(index));
        }
        if !item.options.iter().any(|option| option == choice) {
            return Err(QuizError::UnknownOption {
                item: index,
                choice: choice.to_string(),
            });
        }

        let correct = item.correct_answer == choice;
        item.answer = QuizAnswer::Answered {
            choice: choice.to_string(),
            correct,
        };

        Ok(AnswerOutcome {
            correct,
            score: self.score(),
            answered: self.answered(),
            total,
            complete: self.is_complete(),
        })
    }
}

/// Build a quiz from the aggregated vocabulary. The RNG is seeded explicitly
/// so that the same analysis always produces the same quiz.
pub fn build_quiz(counts: &[WordCount], seed: u64) -> Quiz {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut items = Vec::new();

    let Some(leader) = counts.first() else {
        return Quiz { items };
    };

    // Item: which word topped the frequency table.
    {
        let mut options = vec![leader.word.clone()];
        options.extend(
            counts
                .iter()
                .skip(1)
                .map(|wc| wc.word.clone())
                .filter(|word| word != &leader.word)
                .take(3),
        );
        for filler in FIXED_DISTRACTORS {
            if options.len() >= 4 {
                break;
            }
            if !options.iter().any(|option| option == filler) {
                options.push(filler.to_string());
            }
        }
        options.shuffle(&mut rng);
        items.push(QuizItem::new(
            "가사에서 가장 자주 등장한 단어는 무엇인가요?".to_string(),
            leader.word.clone(),
            options,
        ));
    }

    // Item: how often the leader occurred.
    {
        let count = leader.count;
        let mut candidates = vec![count, count + 1, count + 2];
        candidates.push(if count > 1 { count - 1 } else { count + 3 });
        candidates.sort_unstable();
        let mut options: Vec<String> = candidates.iter().map(u32::to_string).collect();
        options.shuffle(&mut rng);
        items.push(QuizItem::new(
            format!("'{}'은(는) 총 몇 번 등장했나요?", leader.word),
            count.to_string(),
            options,
        ));
    }

    // Items: part of speech of individual vocabulary words.
    for wc in counts.iter().take(QUIZ_SIZE) {
        if items.len() >= QUIZ_SIZE {
            break;
        }
        let mut options: Vec<String> = PartOfSpeech::CONTENT_WORDS
            .iter()
            .map(|pos| pos.korean_label().to_string())
            .collect();
        options.shuffle(&mut rng);
        items.push(QuizItem::new(
            format!("'{}'의 품사는 무엇인가요?", wc.word),
            wc.pos.korean_label().to_string(),
            options,
        ));
    }

    Quiz { items }
}

#[derive(Clone, Copy, Debug, serde::Serialize, Eq, PartialEq)]
pub struct StudyLink {
    pub label: &'static str,
    pub url: &'static str,
}

/// External references shown under the feedback card.
pub const STUDY_LINKS: [StudyLink; 4] = [
    StudyLink {
        label: "네이버 국어사전",
        url: "https://dict.naver.com",
    },
    StudyLink {
        label: "TOPIK 공식 홈페이지",
        url: "https://www.topik.go.kr",
    },
    StudyLink {
        label: "세종학당재단",
        url: "https://www.sejonghakdang.org",
    },
    StudyLink {
        label: "K-Contents 학습",
        url: "https://vlive.tv",
    },
];

#[derive(Clone, Debug, serde::Serialize, Eq, PartialEq)]
pub struct Feedback {
    pub passed: bool,
    pub advice_title: &'static str,
    pub advice: &'static str,
    pub reference_title: &'static str,
    pub references: Vec<StudyLink>,
}

/// Pick the canned study advice for a total score.
pub fn feedback(score: u32) -> Feedback {
    if score >= PASS_THRESHOLD {
        Feedback {
            passed: true,
            advice_title: "[조언 1] 심화 학습 가이드",
            advice: "이미 훌륭한 실력을 갖추고 계시네요! 이제 가사의 '은유적 표현'이나 \
                     '신조어'에 주목해 보세요. 한국의 문학 작품이나 에세이를 병행하면 \
                     표현의 깊이가 달라질 거예요.",
            reference_title: "[조언 2] 심화 학습 레퍼런스",
            references: STUDY_LINKS.to_vec(),
        }
    } else {
        Feedback {
            passed: false,
            advice_title: "[조언 1] 기초 학습 가이드",
            advice: "조급해하지 마세요! 가사 속의 '명사'부터 하나씩 수집해 보는 건 \
                     어떨까요? 좋아하는 가수의 인터뷰 영상을 자막과 함께 보며 발음을 \
                     익히는 것부터 시작해 보세요.",
            reference_title: "[조언 2] 기초 학습 레퍼런스",
            references: STUDY_LINKS.to_vec(),
        }
    }
}
