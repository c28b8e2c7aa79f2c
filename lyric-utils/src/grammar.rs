//! Static grammar reference cards shown alongside the analysis.

#[derive(Clone, Copy, Debug, serde::Serialize, Eq, PartialEq)]
pub struct GrammarCard {
    pub title: &'static str,
    pub explanation: &'static str,
    pub example: &'static str,
}

/// The fixed card set. Content is study material, not derived from the input.
pub const GRAMMAR_CARDS: [GrammarCard; 4] = [
    GrammarCard {
        title: "조사 (Particles)",
        explanation: "명사 뒤에 붙어 문장 속 역할을 표시합니다. 은/는은 주제를, \
                      이/가는 주어를, 을/를은 목적어를 나타냅니다.",
        example: "나는 너를 사랑해 — '는'은 주제, '를'은 목적어 표시",
    },
    GrammarCard {
        title: "어미 활용 (Verb endings)",
        explanation: "동사와 형용사는 어간에 어미가 붙어 활용됩니다. 사전에는 \
                      기본형('-다')으로 실려 있습니다.",
        example: "사랑하다 → 사랑해 (해체), 사랑합니다 (합쇼체)",
    },
    GrammarCard {
        title: "부사 (Adverbs)",
        explanation: "동사나 형용사를 꾸며 정도와 방식을 나타냅니다. 가사에서 \
                      감정의 세기를 표현할 때 자주 쓰입니다.",
        example: "너무 많이 사랑해 — '너무'와 '많이'가 '사랑해'를 수식",
    },
    GrammarCard {
        title: "높임말 (Honorifics)",
        explanation: "말하는 상대에 따라 어미와 어휘가 달라집니다. 노래 가사는 \
                      대개 친근한 반말체를 사용합니다.",
        example: "사랑해 (반말) / 사랑해요 (존댓말)",
    },
];
