//! Hand-curated starter corpus.
//!
//! Inserted by [`Storage::seed_initial_corpus`](crate::Storage::seed_initial_corpus)
//! so a fresh database has usable vocabulary before any extraction run.

use aozora_shared::SlotType::{self, Action, Agent, Discovery, Emotion, Location};

/// Starter slot words: `(genre, slot, word, weight)`.
pub(crate) const SEED_WORDS: &[(&str, SlotType, &str, f64)] = &[
    // neutral
    ("neutral", Agent, "人", 1.0),
    ("neutral", Agent, "彼", 0.9),
    ("neutral", Agent, "彼女", 0.9),
    ("neutral", Agent, "私", 0.8),
    ("neutral", Agent, "みんな", 0.7),
    ("neutral", Location, "部屋", 0.9),
    ("neutral", Location, "公園", 0.8),
    ("neutral", Location, "街", 0.8),
    ("neutral", Location, "駅", 0.7),
    ("neutral", Location, "家", 0.9),
    ("neutral", Discovery, "本", 0.8),
    ("neutral", Discovery, "手紙", 0.7),
    ("neutral", Discovery, "カバン", 0.6),
    ("neutral", Discovery, "時計", 0.6),
    ("neutral", Discovery, "写真", 0.7),
    ("neutral", Action, "歩く", 0.9),
    ("neutral", Action, "見る", 0.9),
    ("neutral", Action, "話す", 0.8),
    ("neutral", Action, "考える", 0.7),
    ("neutral", Action, "座る", 0.6),
    ("neutral", Emotion, "嬉しい", 0.7),
    ("neutral", Emotion, "悲しい", 0.7),
    ("neutral", Emotion, "驚く", 0.6),
    ("neutral", Emotion, "不思議", 0.6),
    ("neutral", Emotion, "穏やか", 0.5),
    // horror
    ("horror", Agent, "影", 1.0),
    ("horror", Agent, "何者か", 0.9),
    ("horror", Agent, "幽霊", 0.8),
    ("horror", Agent, "怪物", 0.7),
    ("horror", Agent, "黒い男", 0.8),
    ("horror", Location, "墓地", 1.0),
    ("horror", Location, "廃屋", 0.9),
    ("horror", Location, "暗闇", 0.9),
    ("horror", Location, "地下室", 0.8),
    ("horror", Location, "森の奥", 0.7),
    ("horror", Discovery, "血", 1.0),
    ("horror", Discovery, "ナイフ", 0.8),
    ("horror", Discovery, "骸骨", 0.9),
    ("horror", Discovery, "人形", 0.7),
    ("horror", Discovery, "日記", 0.6),
    ("horror", Action, "震える", 0.9),
    ("horror", Action, "叫ぶ", 0.8),
    ("horror", Action, "逃げる", 0.9),
    ("horror", Action, "襲う", 0.7),
    ("horror", Action, "心臓が凍る", 0.8),
    ("horror", Emotion, "恐怖", 1.0),
    ("horror", Emotion, "不安", 0.9),
    ("horror", Emotion, "絶望", 0.8),
    ("horror", Emotion, "恐ろしい", 0.9),
    ("horror", Emotion, "不気味", 0.7),
    // romance
    ("romance", Agent, "恋人", 1.0),
    ("romance", Agent, "君", 0.9),
    ("romance", Agent, "あなた", 0.9),
    ("romance", Agent, "二人", 0.8),
    ("romance", Agent, "彼氏", 0.7),
    ("romance", Location, "カフェ", 0.9),
    ("romance", Location, "海辺", 0.8),
    ("romance", Location, "公園のベンチ", 0.8),
    ("romance", Location, "夜景", 0.7),
    ("romance", Location, "橋の上", 0.7),
    ("romance", Discovery, "花束", 0.9),
    ("romance", Discovery, "指輪", 0.8),
    ("romance", Discovery, "ラブレター", 0.7),
    ("romance", Discovery, "プレゼント", 0.7),
    ("romance", Discovery, "写真", 0.6),
    ("romance", Action, "抱きしめる", 0.9),
    ("romance", Action, "キスする", 0.8),
    ("romance", Action, "手を繋ぐ", 0.8),
    ("romance", Action, "微笑む", 0.7),
    ("romance", Action, "見つめる", 0.7),
    ("romance", Emotion, "愛", 1.0),
    ("romance", Emotion, "幸せ", 0.9),
    ("romance", Emotion, "ときめき", 0.8),
    ("romance", Emotion, "切ない", 0.7),
    ("romance", Emotion, "優しい", 0.6),
    // scifi
    ("scifi", Agent, "ロボット", 1.0),
    ("scifi", Agent, "宇宙人", 0.9),
    ("scifi", Agent, "AI", 0.9),
    ("scifi", Agent, "科学者", 0.8),
    ("scifi", Agent, "サイボーグ", 0.7),
    ("scifi", Location, "宇宙船", 1.0),
    ("scifi", Location, "研究所", 0.8),
    ("scifi", Location, "火星", 0.9),
    ("scifi", Location, "コロニー", 0.7),
    ("scifi", Location, "仮想空間", 0.8),
    ("scifi", Discovery, "レーザー銃", 0.8),
    ("scifi", Discovery, "チップ", 0.7),
    ("scifi", Discovery, "ワームホール", 0.9),
    ("scifi", Discovery, "データ", 0.7),
    ("scifi", Discovery, "ホログラム", 0.6),
    ("scifi", Action, "スキャンする", 0.8),
    ("scifi", Action, "テレポートする", 0.9),
    ("scifi", Action, "ハッキングする", 0.7),
    ("scifi", Action, "分析する", 0.7),
    ("scifi", Action, "起動する", 0.6),
    ("scifi", Emotion, "進歩的", 0.7),
    ("scifi", Emotion, "論理的", 0.8),
    ("scifi", Emotion, "未来的", 0.9),
    ("scifi", Emotion, "革新的", 0.7),
    ("scifi", Emotion, "冷静", 0.6),
    // comedy
    ("comedy", Agent, "お笑い芸人", 0.9),
    ("comedy", Agent, "ピエロ", 0.8),
    ("comedy", Agent, "変なオジサン", 0.7),
    ("comedy", Agent, "マヌケ君", 0.8),
    ("comedy", Agent, "ドジな子", 0.7),
    ("comedy", Location, "舞台", 0.8),
    ("comedy", Location, "サーカス", 0.7),
    ("comedy", Location, "お祭り", 0.7),
    ("comedy", Location, "ゲームセンター", 0.6),
    ("comedy", Location, "バナナの皮", 0.9),
    ("comedy", Discovery, "パイ", 0.8),
    ("comedy", Discovery, "バナナ", 0.9),
    ("comedy", Discovery, "ラッパ", 0.7),
    ("comedy", Discovery, "変な帽子", 0.6),
    ("comedy", Discovery, "クッション", 0.6),
    ("comedy", Action, "転ぶ", 0.9),
    ("comedy", Action, "滑る", 0.8),
    ("comedy", Action, "コケる", 0.7),
    ("comedy", Action, "ボケる", 0.8),
    ("comedy", Action, "すっとぼける", 0.7),
    ("comedy", Emotion, "楽しい", 1.0),
    ("comedy", Emotion, "おかしい", 0.9),
    ("comedy", Emotion, "ばかばかしい", 0.8),
    ("comedy", Emotion, "のんき", 0.7),
    ("comedy", Emotion, "ハッピー", 0.6),
];

/// Starter templates: `(template_type, template, genre)`.
pub(crate) const SEED_TEMPLATES: &[(&str, &str, Option<&str>)] = &[
    ("discovery", "{agent}が{location}で{discovery}を見つけた。", None),
    ("discovery", "{location}にあった{discovery}を{agent}が発見した。", None),
    ("emotion", "{agent}は{emotion}を感じた。", None),
    ("emotion", "それはとても{emotion}だった。", None),
    ("action", "{agent}は{location}で{action}。", None),
    ("action", "{action}。それが{agent}の選択だった。", None),
    ("description", "{location}は{emotion}雰囲気に包まれていた。", None),
    ("description", "そこには{discovery}があった。", None),
    ("discovery", "{agent}は{location}で恐ろしい{discovery}を見つけてしまった。", Some("horror")),
    ("emotion", "{agent}の心臓は恐怖で凍りついた。", Some("horror")),
    ("discovery", "{agent}は{location}で美しい{discovery}を受け取った。", Some("romance")),
    ("emotion", "{agent}の心は{emotion}で満たされた。", Some("romance")),
    ("discovery", "{agent}は{location}で高度な{discovery}を分析した。", Some("scifi")),
    ("action", "{agent}はシステムを{action}。", Some("scifi")),
    ("discovery", "{agent}は{location}でおかしな{discovery}を見つけて笑った。", Some("comedy")),
    ("action", "{agent}は{location}で盛大に{action}。", Some("comedy")),
];

/// Starter phrases: `(genre, phrase)`.
pub(crate) const SEED_PHRASES: &[(&str, &str)] = &[
    ("neutral", "それは"),
    ("neutral", "しかし"),
    ("neutral", "そして"),
    ("neutral", "だが"),
    ("neutral", "やがて"),
    ("horror", "闇の中から"),
    ("horror", "血の匂いが"),
    ("horror", "背筋が凍るような"),
    ("horror", "不気味な音が"),
    ("horror", "恐怖に震えながら"),
    ("romance", "優しく"),
    ("romance", "愛おしく"),
    ("romance", "心がときめいて"),
    ("romance", "二人の時間は"),
    ("romance", "永遠に"),
    ("scifi", "データによると"),
    ("scifi", "システムが"),
    ("scifi", "量子的に"),
    ("scifi", "AIの判断では"),
    ("scifi", "未来からの"),
    ("comedy", "うっかり"),
    ("comedy", "ドタバタと"),
    ("comedy", "おっちょこちょい"),
    ("comedy", "たまたま"),
    ("comedy", "なぜか"),
];
