// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scraper::Html;

/// 去除HTML标记并规范化空白
///
/// 搜索接口返回的摘要带有 `<span class="searchmatch">` 等高亮标记，
/// 这里只保留文本节点，并将连续空白折叠为单个空格
///
/// # 参数
///
/// * `fragment` - HTML片段
///
/// # 返回值
///
/// 纯文本
pub fn strip_markup(fragment: &str) -> String {
    let document = Html::parse_fragment(fragment);
    let text: String = document.root_element().text().collect();
    collapse_whitespace(&text)
}

/// 将连续空白折叠为单个空格并去除首尾空白
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
