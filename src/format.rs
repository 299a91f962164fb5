//! Plain-text rendering for the CLI.
//!
//! Every function returns a `String`; printing is left to the caller.

use crate::types::{Category, Item, PortfolioDetail, PortfolioSummary};
use comfy_table::presets::{NOTHING, UTF8_FULL};
use comfy_table::{CellAlignment, Table};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt::Write as _;

const MAX_TREE_SHEETS: usize = 5;
const MAX_TREE_ITEMS: usize = 10;

/// `"USD 1,234.50"`, or `"N/A"` when the amount is unknown.
pub fn format_currency(amount: Option<f64>, currency: &str) -> String {
    match amount {
        Some(amount) => format!("{currency} {}", group_decimal(&format!("{amount:.2}"))),
        None => "N/A".to_string(),
    }
}

/// Thousands separators, at most four decimals, trailing zeros trimmed.
/// Zero renders as an empty string.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return String::new();
    }
    let grouped = group_decimal(&format!("{value:.4}"));
    grouped
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Pretty JSON for `--raw` output.
pub fn raw_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Table of portfolios with their 1-based index.
pub fn portfolio_list(portfolios: &[PortfolioSummary]) -> String {
    if portfolios.is_empty() {
        return "No portfolios found.".to_string();
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["#", "Name", "Currency", "ID"]);
    for (idx, portfolio) in portfolios.iter().enumerate() {
        table.add_row(vec![
            (idx + 1).to_string(),
            portfolio.name.clone(),
            portfolio.currency.clone(),
            portfolio.id.clone(),
        ]);
    }
    right_align(&mut table, &[0]);

    format!(
        "Portfolios ({})\n{table}\n\n\
         Tip: Use the index number (e.g., 'kubera show 1') instead of the full ID",
        portfolios.len()
    )
}

/// Portfolio header plus per-sheet totals for each category.
pub fn portfolio_detail(portfolio: &PortfolioDetail) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", portfolio.name.as_deref().unwrap_or("Portfolio"));
    let _ = writeln!(out, "ID: {}", portfolio.id.as_deref().unwrap_or("N/A"));

    if let Some(net_worth) = &portfolio.net_worth {
        let _ = writeln!(
            out,
            "\nNet Worth: {}",
            format_currency(net_worth.amount(), net_worth_currency(portfolio))
        );
    }

    let sections = [
        ("Assets", Category::Asset, portfolio.asset_total),
        ("Debts", Category::Debt, portfolio.debt_total),
        ("Insurance", Category::Insurance, None),
    ];
    for (title, category, reported_total) in sections {
        let items = portfolio.items(category);
        if items.is_empty() {
            continue;
        }

        let sheets = group_by(items.iter(), |item| item.sheet_name.as_deref());
        let total = reported_total.or_else(|| {
            (category == Category::Insurance).then(|| items.iter().map(Item::value_amount).sum())
        });
        let total_str = total
            .map(|t| format!(" - Total: {}", format_currency(Some(t), "USD")))
            .unwrap_or_default();
        let _ = writeln!(out, "\n{title} ({} items){total_str}", items.len());

        // A single insurance sheet adds nothing over the header line.
        if category == Category::Insurance && sheets.len() <= 1 {
            continue;
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(vec!["Sheet", "Items", "Total Value"]);
        for (sheet, sheet_items) in &sheets {
            let sheet_total: f64 = sheet_items.iter().map(|i| i.value_amount()).sum();
            let currency = sheet_items.first().map_or("USD", |i| i.currency());
            table.add_row(vec![
                sheet.clone(),
                sheet_items.len().to_string(),
                format_currency(Some(sheet_total), currency),
            ]);
        }
        right_align(&mut table, &[1, 2]);
        let _ = writeln!(out, "{table}");
    }

    if !portfolio.documents.is_empty() {
        let _ = writeln!(out, "\nDocuments: {} documents", portfolio.documents.len());
    }

    out
}

/// Category / sheet / item tree, truncated to keep large portfolios readable.
pub fn portfolio_tree(portfolio: &PortfolioDetail) -> String {
    let net_worth = portfolio
        .net_worth
        .as_ref()
        .map(|nw| {
            format!(
                " - Net Worth: {}",
                format_currency(nw.amount(), net_worth_currency(portfolio))
            )
        })
        .unwrap_or_default();
    let mut root = TreeNode::new(format!(
        "{}{net_worth}",
        portfolio.name.as_deref().unwrap_or("Portfolio")
    ));

    if !portfolio.assets.is_empty() {
        let total = portfolio
            .asset_total
            .map(|t| format!(" - Total: {}", format_currency(Some(t), "USD")))
            .unwrap_or_default();
        let mut branch = TreeNode::new(format!("Assets ({}){total}", portfolio.assets.len()));

        let sheets = group_by(portfolio.assets.iter(), |item| item.sheet_name.as_deref());
        for (sheet, items) in sheets.iter().take(MAX_TREE_SHEETS) {
            let mut sheet_node = TreeNode::new(sheet.clone());
            add_item_leaves(&mut sheet_node, items.iter().copied());
            branch.children.push(sheet_node);
        }
        if sheets.len() > MAX_TREE_SHEETS {
            branch.push_leaf(format!(
                "... {} more categories",
                sheets.len() - MAX_TREE_SHEETS
            ));
        }
        root.children.push(branch);
    }

    if !portfolio.debts.is_empty() {
        let total = portfolio
            .debt_total
            .map(|t| format!(" - Total: {}", format_currency(Some(t), "USD")))
            .unwrap_or_default();
        let mut branch = TreeNode::new(format!("Debts ({}){total}", portfolio.debts.len()));
        add_item_leaves(&mut branch, portfolio.debts.iter());
        root.children.push(branch);
    }

    if !portfolio.insurance.is_empty() {
        let mut branch = TreeNode::new(format!("Insurance ({})", portfolio.insurance.len()));
        add_item_leaves(&mut branch, portfolio.insurance.iter());
        root.children.push(branch);
    }

    root.render()
}

/// Details of a single item, e.g. after an update.
pub fn item_detail(item: &Item) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", item.name.as_deref().unwrap_or("Item"));
    let _ = writeln!(out, "ID: {}", item.id);

    if let Some(value) = &item.value {
        let _ = writeln!(
            out,
            "Value: {}",
            format_currency(value.amount, value.currency.as_deref().unwrap_or(""))
        );
    }
    if let Some(cost) = &item.cost {
        let _ = writeln!(
            out,
            "Cost: {}",
            format_currency(cost.amount, cost.currency.as_deref().unwrap_or(""))
        );
    }
    if let Some(description) = item.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(out, "Description: {description}");
    }
    if let Some(ticker) = item.ticker.as_deref().filter(|t| !t.is_empty()) {
        let _ = writeln!(out, "Ticker: {ticker}");
    }
    if let Some(quantity) = item.quantity.filter(|q| *q != 0.0) {
        let _ = writeln!(out, "Quantity: {}", format_number(quantity));
    }

    out
}

/// Drill-down view of one sheet: totals, gains and a table per section.
///
/// Parent accounts are left out so their holdings are not counted twice.
pub fn sheet_detail(
    items: &[&Item],
    sheet_name: &str,
    category: Category,
    portfolio_name: &str,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{portfolio_name}");
    let _ = writeln!(out, "{}: {sheet_name}", title_case(&category.to_string()));

    let parent_ids: HashSet<&str> = items
        .iter()
        .filter_map(|item| item.parent.as_ref().map(|p| p.id.as_str()))
        .collect();
    let leaves: Vec<&Item> = items
        .iter()
        .copied()
        .filter(|item| !parent_ids.contains(item.id.as_str()))
        .collect();

    let total_value: f64 = leaves.iter().map(|i| i.value_amount()).sum();
    let total_cost: f64 = leaves.iter().filter_map(|i| i.cost_amount()).sum();
    let _ = writeln!(out, "\n{}", value_line(total_value, total_cost, "Total Value", "Cost Basis"));

    let sections = group_by(leaves.iter().copied(), |item| item.section_name.as_deref());
    let _ = writeln!(
        out,
        "\nTotal Items: {} across {} section(s)",
        leaves.len(),
        sections.len()
    );

    for (section, section_items) in &sections {
        let value: f64 = section_items.iter().map(|i| i.value_amount()).sum();
        let cost: f64 = section_items.iter().filter_map(|i| i.cost_amount()).sum();
        let _ = writeln!(out, "\n{section} ({} items)", section_items.len());
        let _ = writeln!(out, "{}", value_line(value, cost, "Value", "Cost"));
        let _ = writeln!(out, "{}", section_table(section_items));
    }

    out
}

fn section_table(items: &[&Item]) -> Table {
    let has_ticker = items.iter().any(|i| i.ticker.as_deref().is_some_and(|t| !t.is_empty()));
    let has_quantity = items.iter().any(|i| i.quantity.is_some_and(|q| q != 0.0));
    let has_cost = items.iter().any(|i| i.cost_amount().is_some_and(|c| c != 0.0));

    let mut header = vec!["Name", "Value"];
    let mut right = vec![1];
    if has_ticker {
        header.push("Ticker");
    }
    if has_quantity {
        right.push(header.len());
        header.push("Quantity");
    }
    if has_cost {
        right.extend(header.len()..header.len() + 3);
        header.extend(["Cost Basis", "Gain/Loss", "Gain %"]);
    }

    let mut table = Table::new();
    table.load_preset(NOTHING).set_header(header);

    for item in items {
        let currency = item.currency();
        let value = item.value_amount();
        let mut row = vec![
            item.name.clone().unwrap_or_else(|| "N/A".to_string()),
            format_currency(Some(value), currency),
        ];
        if has_ticker {
            row.push(item.ticker.clone().unwrap_or_default());
        }
        if has_quantity {
            row.push(item.quantity.map(format_number).unwrap_or_default());
        }
        if has_cost {
            match item.cost_amount() {
                Some(cost) if cost > 0.0 => {
                    let gain = value - cost;
                    let sign = if gain >= 0.0 { "+" } else { "" };
                    row.push(format_currency(Some(cost), currency));
                    row.push(format!("{sign}{}", format_currency(Some(gain), currency)));
                    row.push(format!("{sign}{:.2}%", gain / cost * 100.0));
                }
                Some(cost) => {
                    row.push(format_currency(Some(cost), currency));
                    row.extend([String::new(), String::new()]);
                }
                None => row.extend([String::new(), String::new(), String::new()]),
            }
        }
        table.add_row(row);
    }
    right_align(&mut table, &right);
    table
}

fn value_line(value: f64, cost: f64, value_label: &str, cost_label: &str) -> String {
    if cost > 0.0 {
        let gain = value - cost;
        let sign = if gain >= 0.0 { "+" } else { "" };
        format!(
            "{value_label}: {} | {cost_label}: {} | Gain: {sign}{} ({sign}{:.2}%)",
            format_currency(Some(value), "USD"),
            format_currency(Some(cost), "USD"),
            format_currency(Some(gain), "USD"),
            gain / cost * 100.0
        )
    } else {
        format!("{value_label}: {}", format_currency(Some(value), "USD"))
    }
}

fn add_item_leaves<'a>(node: &mut TreeNode, items: impl ExactSizeIterator<Item = &'a Item>) {
    let count = items.len();
    for item in items.take(MAX_TREE_ITEMS) {
        let amount = item.value.as_ref().and_then(|v| v.amount);
        node.push_leaf(format!(
            "{}: {}",
            item.name.as_deref().unwrap_or("Unknown"),
            format_currency(amount, item.currency())
        ));
    }
    if count > MAX_TREE_ITEMS {
        node.push_leaf(format!("... {} more", count - MAX_TREE_ITEMS));
    }
}

fn net_worth_currency(portfolio: &PortfolioDetail) -> &str {
    portfolio
        .net_worth
        .as_ref()
        .and_then(|nw| nw.currency())
        .or(portfolio.currency.as_deref())
        .unwrap_or("USD")
}

/// Group items by a key, keeping first-seen order. Missing keys go to "Other".
fn group_by<'a>(
    items: impl Iterator<Item = &'a Item>,
    key: impl Fn(&Item) -> Option<&str>,
) -> Vec<(String, Vec<&'a Item>)> {
    let mut groups: Vec<(String, Vec<&'a Item>)> = Vec::new();
    for item in items {
        let name = key(item).unwrap_or("Other");
        match groups.iter_mut().find(|(g, _)| g == name) {
            Some((_, members)) => members.push(item),
            None => groups.push((name.to_string(), vec![item])),
        }
    }
    groups
}

fn right_align(table: &mut Table, columns: &[usize]) {
    for &idx in columns {
        if let Some(column) = table.column_mut(idx) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}

/// Insert thousands separators into a plain decimal string like "-1234.50".
fn group_decimal(formatted: &str) -> String {
    let (sign, digits) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeNode {
    fn new(label: String) -> Self {
        Self {
            label,
            children: Vec::new(),
        }
    }

    fn push_leaf(&mut self, label: String) {
        self.children.push(TreeNode::new(label));
    }

    fn render(&self) -> String {
        let mut out = format!("{}\n", self.label);
        self.render_children("", &mut out);
        out
    }

    fn render_children(&self, prefix: &str, out: &mut String) {
        let last = self.children.len().saturating_sub(1);
        for (i, child) in self.children.iter().enumerate() {
            let (branch, indent) = if i == last {
                ("└── ", "    ")
            } else {
                ("├── ", "│   ")
            };
            let _ = writeln!(out, "{prefix}{branch}{}", child.label);
            child.render_children(&format!("{prefix}{indent}"), out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: serde_json::Value) -> Item {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(Some(1234.5), "USD"), "USD 1,234.50");
        assert_eq!(format_currency(Some(0.0), "EUR"), "EUR 0.00");
        assert_eq!(format_currency(Some(-1234567.891), "USD"), "USD -1,234,567.89");
        assert_eq!(format_currency(Some(999.999), "USD"), "USD 1,000.00");
        assert_eq!(format_currency(None, "USD"), "N/A");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(5000.0), "5,000");
        assert_eq!(format_number(1234.56789), "1,234.5679");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(0.0), "");
    }

    #[test]
    fn test_portfolio_list_table() {
        let portfolios: Vec<PortfolioSummary> = serde_json::from_value(json!([
            {"id": "portfolio_001", "name": "Test Portfolio 1", "currency": "USD"},
            {"id": "portfolio_002", "name": "Test Portfolio 2", "currency": "EUR"}
        ]))
        .unwrap();

        let out = portfolio_list(&portfolios);
        assert!(out.starts_with("Portfolios (2)"));
        assert!(out.contains("Test Portfolio 2"));
        assert!(out.contains("portfolio_001"));
        assert!(out.contains("kubera show 1"));
        assert_eq!(portfolio_list(&[]), "No portfolios found.");
    }

    #[test]
    fn test_portfolio_detail_groups_sheets() {
        let detail: PortfolioDetail = serde_json::from_value(json!({
            "id": "p1",
            "name": "Personal",
            "netWorth": {"amount": 320000.0, "currency": "USD"},
            "asset": [
                {"id": "a1", "sheetName": "Banks", "value": {"amount": 5000.0, "currency": "USD"}},
                {"id": "a2", "sheetName": "Banks", "value": {"amount": 1000.0, "currency": "USD"}},
                {
                    "id": "a3",
                    "sheetName": "Investments",
                    "value": {"amount": 15000.0, "currency": "USD"}
                }
            ],
            "document": [{"id": "d1"}]
        }))
        .unwrap();

        let out = portfolio_detail(&detail);
        assert!(out.contains("Net Worth: USD 320,000.00"));
        assert!(out.contains("Assets (3 items)"));
        assert!(out.contains("USD 6,000.00"));
        assert!(out.contains("Investments"));
        assert!(out.contains("Documents: 1 documents"));
        assert!(!out.contains("Debts"));
    }

    #[test]
    fn test_tree_truncates_items() {
        let assets: Vec<_> = (0..12)
            .map(|i| {
                json!({
                    "id": format!("a{i}"),
                    "name": format!("Asset {i}"),
                    "sheetName": "Banks",
                    "value": {"amount": 1.0}
                })
            })
            .collect();
        let detail: PortfolioDetail =
            serde_json::from_value(json!({"name": "Personal", "asset": assets})).unwrap();

        let out = portfolio_tree(&detail);
        assert!(out.starts_with("Personal\n"));
        assert!(out.contains("├── ") || out.contains("└── "));
        assert!(out.contains("Asset 9: USD 1.00"));
        assert!(!out.contains("Asset 10:"));
        assert!(out.contains("... 2 more"));
    }

    #[test]
    fn test_sheet_detail_excludes_parents_and_reports_gain() {
        let parent = item(json!({
            "id": "acct", "name": "Brokerage", "sectionName": "Taxable",
            "value": {"amount": 50000.0, "currency": "USD"}
        }));
        let holding = item(json!({
            "id": "h1", "name": "Fund", "sectionName": "Taxable", "ticker": "TESTHYX",
            "quantity": 5000.0,
            "value": {"amount": 50000.0, "currency": "USD"},
            "cost": {"amount": 40000.0, "currency": "USD"},
            "parent": {"id": "acct", "name": "Brokerage"}
        }));

        let out = sheet_detail(&[&parent, &holding], "Investments", Category::Asset, "Personal");
        assert!(out.contains("Asset: Investments"));
        assert!(out.contains("Total Value: USD 50,000.00"));
        assert!(out.contains("Gain: +USD 10,000.00 (+25.00%)"));
        assert!(out.contains("Total Items: 1 across 1 section(s)"));
        assert!(out.contains("TESTHYX"));
        assert!(out.contains("5,000"));
    }

    #[test]
    fn test_item_detail() {
        let updated = item(json!({
            "id": "asset_001",
            "name": "Updated Item Name",
            "value": {"amount": 5500.0, "currency": "USD"},
            "description": "Updated description",
            "cost": {"amount": 5000.0, "currency": "USD"}
        }));

        let out = item_detail(&updated);
        assert!(out.starts_with("Updated Item Name\nID: asset_001\n"));
        assert!(out.contains("Value: USD 5,500.00"));
        assert!(out.contains("Cost: USD 5,000.00"));
        assert!(out.contains("Description: Updated description"));
    }

    #[test]
    fn test_group_decimal() {
        assert_eq!(group_decimal("1234567.00"), "1,234,567.00");
        assert_eq!(group_decimal("123"), "123");
        assert_eq!(group_decimal("-1000"), "-1,000");
    }
}
