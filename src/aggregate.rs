//! Chart series derived from the Record Store. Pure functions, recomputed on
//! every render.

use std::collections::HashMap;

use crate::models::{BarDatum, BudgetSummary, ExpenseRecord, PieDatum};

/// One bar group per summary line, in service order.
pub fn to_bar_series(summaries: &[BudgetSummary]) -> Vec<BarDatum> {
    summaries
        .iter()
        .map(|s| BarDatum {
            category: s.category.clone(),
            spent: s.spent,
            budget: s.budget,
        })
        .collect()
}

/// Expense totals per category, ordered by each category's first appearance.
/// Categories are compared as exact, case-sensitive strings.
pub fn to_pie_series(expenses: &[ExpenseRecord]) -> Vec<PieDatum> {
    let mut series: Vec<PieDatum> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for expense in expenses {
        match index.get(expense.category.as_str()) {
            Some(&i) => series[i].total += expense.amount,
            None => {
                index.insert(expense.category.as_str(), series.len());
                series.push(PieDatum {
                    category: expense.category.clone(),
                    total: expense.amount,
                });
            }
        }
    }
    series
}

pub fn series_total(series: &[PieDatum]) -> f64 {
    series.iter().map(|d| d.total).sum()
}
