//! Traditional to Simplified Chinese character mapping.
//!
//! Covers the Hanja commonly produced by candidate selection. Characters
//! without a mapping pass through unchanged.

const TABLE: [(char, char); 64] = [
    ('國', '国'),
    ('學', '学'),
    ('門', '门'),
    ('東', '东'),
    ('車', '车'),
    ('馬', '马'),
    ('龍', '龙'),
    ('華', '华'),
    ('萬', '万'),
    ('樂', '乐'),
    ('氣', '气'),
    ('漢', '汉'),
    ('語', '语'),
    ('愛', '爱'),
    ('醫', '医'),
    ('體', '体'),
    ('圖', '图'),
    ('書', '书'),
    ('會', '会'),
    ('電', '电'),
    ('買', '买'),
    ('賣', '卖'),
    ('見', '见'),
    ('貝', '贝'),
    ('長', '长'),
    ('鳥', '鸟'),
    ('風', '风'),
    ('雲', '云'),
    ('飛', '飞'),
    ('發', '发'),
    ('歲', '岁'),
    ('處', '处'),
    ('產', '产'),
    ('廣', '广'),
    ('點', '点'),
    ('黨', '党'),
    ('幾', '几'),
    ('機', '机'),
    ('關', '关'),
    ('觀', '观'),
    ('歡', '欢'),
    ('舊', '旧'),
    ('禮', '礼'),
    ('藝', '艺'),
    ('陽', '阳'),
    ('陰', '阴'),
    ('錢', '钱'),
    ('鐵', '铁'),
    ('銀', '银'),
    ('魚', '鱼'),
    ('話', '话'),
    ('讀', '读'),
    ('寫', '写'),
    ('聽', '听'),
    ('開', '开'),
    ('閉', '闭'),
    ('問', '问'),
    ('間', '间'),
    ('無', '无'),
    ('爲', '为'),
    ('來', '来'),
    ('對', '对'),
    ('韓', '韩'),
    ('戰', '战'),
];

/// Map every traditional character in `s` to its simplified form.
pub fn traditional_to_simplified(s: &str) -> String {
    s.chars()
        .map(|c| {
            TABLE
                .iter()
                .find(|(t, _)| *t == c)
                .map(|(_, s)| *s)
                .unwrap_or(c)
        })
        .collect()
}
