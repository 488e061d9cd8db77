use std::rc::Rc;

use expense_tracker_frontend::aggregate::{series_total, to_bar_series, to_pie_series};
use expense_tracker_frontend::{
    telemetry, AuthMode, BarDatum, BrowserTracker, BudgetDraft, ClientConfig, Credentials,
    ExpenseDraft, PieDatum, RecordSnapshot, Submission,
};
use wasm_bindgen_futures::spawn_local;
use web_sys::InputEvent;
use yew::prelude::*;

const COLORS: [&str; 6] = [
    "#0088FE", "#00C49F", "#FFBB28", "#FF8042", "#A28BFF", "#FF6F91",
];
const CURRENCY_SYMBOL: &str = "₹";

/// Shared handle to the client core. Compared by identity.
#[derive(Clone)]
struct Tracker(Rc<BrowserTracker>);

impl PartialEq for Tracker {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Clone, Copy, PartialEq)]
enum AuthStatus {
    Checking,
    Authenticated,
    Unauthenticated,
}

fn bind<T: Clone + 'static>(
    state: &UseStateHandle<T>,
    update: fn(&mut T, String),
) -> Callback<InputEvent> {
    let state = state.clone();
    Callback::from(move |e: InputEvent| {
        let input: web_sys::HtmlInputElement = e.target_unchecked_into();
        let mut next = (*state).clone();
        update(&mut next, input.value());
        state.set(next);
    })
}

#[function_component(App)]
fn app() -> Html {
    let tracker = use_memo(
        |_| Tracker(Rc::new(BrowserTracker::browser(ClientConfig::default()))),
        (),
    );
    let tracker = (*tracker).clone();
    let auth_status = use_state(|| AuthStatus::Checking);
    let records = use_state(RecordSnapshot::default);

    {
        let tracker = tracker.clone();
        let auth_status = auth_status.clone();
        let records = records.clone();
        use_effect_with_deps(
            move |_| {
                if tracker.0.restore_session().is_some() {
                    auth_status.set(AuthStatus::Authenticated);
                    spawn_local(async move {
                        tracker.0.reload().await;
                        records.set(tracker.0.snapshot());
                        if !tracker.0.is_authenticated() {
                            auth_status.set(AuthStatus::Unauthenticated);
                        }
                    });
                } else {
                    auth_status.set(AuthStatus::Unauthenticated);
                }
                || ()
            },
            (),
        );
    }

    // Re-read the core after any async flow; it may have ended the session.
    let on_refresh = {
        let tracker = tracker.clone();
        let auth_status = auth_status.clone();
        let records = records.clone();
        Callback::from(move |_| {
            records.set(tracker.0.snapshot());
            if tracker.0.is_authenticated() {
                auth_status.set(AuthStatus::Authenticated);
            } else {
                auth_status.set(AuthStatus::Unauthenticated);
            }
        })
    };

    let on_logout = {
        let tracker = tracker.clone();
        let auth_status = auth_status.clone();
        let records = records.clone();
        Callback::from(move |_| {
            tracker.0.end_session();
            records.set(RecordSnapshot::default());
            auth_status.set(AuthStatus::Unauthenticated);
        })
    };

    match *auth_status {
        AuthStatus::Checking => html! {
            <div class="min-h-screen flex items-center justify-center bg-background text-muted-foreground">
                {"Checking session..."}
            </div>
        },
        AuthStatus::Unauthenticated => html! {
            <AuthScreen tracker={tracker} on_authenticated={on_refresh} />
        },
        AuthStatus::Authenticated => html! {
            <Dashboard
                tracker={tracker}
                records={(*records).clone()}
                on_refresh={on_refresh}
                on_logout={on_logout}
            />
        },
    }
}

#[derive(Properties, PartialEq)]
struct AuthScreenProps {
    tracker: Tracker,
    on_authenticated: Callback<()>,
}

#[function_component(AuthScreen)]
fn auth_screen(props: &AuthScreenProps) -> Html {
    let mode = use_state(|| AuthMode::Login);
    let username = use_state(String::new);
    let password = use_state(String::new);
    let error = use_state(|| None::<String>);
    let loading = use_state(|| false);

    let on_submit = {
        let tracker = props.tracker.clone();
        let mode = mode.clone();
        let username = username.clone();
        let password = password.clone();
        let error = error.clone();
        let loading = loading.clone();
        let on_authenticated = props.on_authenticated.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let credentials = Credentials {
                username: (*username).clone(),
                password: (*password).clone(),
            };
            let mode = *mode;
            let tracker = tracker.clone();
            let username = username.clone();
            let password = password.clone();
            let error = error.clone();
            let loading = loading.clone();
            let on_authenticated = on_authenticated.clone();

            loading.set(true);
            error.set(None);
            spawn_local(async move {
                match tracker.0.authenticate(mode, &credentials).await {
                    Ok(_) => {
                        username.set(String::new());
                        password.set(String::new());
                        on_authenticated.emit(());
                    }
                    Err(err) => error.set(Some(err.to_string())),
                }
                loading.set(false);
            });
        })
    };

    let toggle_mode = {
        let mode = mode.clone();
        let error = error.clone();
        Callback::from(move |_| {
            mode.set(mode.toggled());
            error.set(None);
        })
    };

    let is_login = *mode == AuthMode::Login;

    html! {
        <div class="min-h-screen flex items-center justify-center bg-background">
            <div class="w-full max-w-md bg-card border border-border rounded-2xl shadow-lg p-8">
                <h1 class="text-2xl font-bold text-foreground text-center mb-6">
                    { if is_login { "Login" } else { "Register" } }
                </h1>

                <form class="space-y-4" onsubmit={on_submit}>
                    <input
                        placeholder="Username"
                        class="w-full px-4 py-2 bg-input border border-input rounded-lg"
                        value={(*username).clone()}
                        oninput={{
                            let username = username.clone();
                            Callback::from(move |e: InputEvent| {
                                let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                                username.set(input.value());
                            })
                        }}
                    />
                    <input
                        placeholder="Password"
                        type="password"
                        class="w-full px-4 py-2 bg-input border border-input rounded-lg"
                        value={(*password).clone()}
                        oninput={{
                            let password = password.clone();
                            Callback::from(move |e: InputEvent| {
                                let input: web_sys::HtmlInputElement = e.target_unchecked_into();
                                password.set(input.value());
                            })
                        }}
                    />

                    if let Some(msg) = &*error {
                        <div class="text-sm text-red-500">{ msg.clone() }</div>
                    }

                    <button
                        type="submit"
                        class="w-full bg-primary text-primary-foreground py-2 rounded-lg font-semibold"
                        disabled={*loading}
                    >
                        { if *loading { "Please wait..." } else if is_login { "Login" } else { "Register" } }
                    </button>
                </form>

                <p class="mt-6 text-center text-sm text-primary cursor-pointer" onclick={toggle_mode}>
                    { if is_login { "No account? Register" } else { "Already have an account? Login" } }
                </p>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct DashboardProps {
    tracker: Tracker,
    records: RecordSnapshot,
    on_refresh: Callback<()>,
    on_logout: Callback<()>,
}

#[function_component(Dashboard)]
fn dashboard(props: &DashboardProps) -> Html {
    let expense_draft = use_state(ExpenseDraft::default);
    let budget_draft = use_state(BudgetDraft::default);
    let error = use_state(|| None::<String>);

    let on_add_expense = {
        let tracker = props.tracker.clone();
        let expense_draft = expense_draft.clone();
        let error = error.clone();
        let on_refresh = props.on_refresh.clone();
        Callback::from(move |_| {
            let tracker = tracker.clone();
            let expense_draft = expense_draft.clone();
            let error = error.clone();
            let on_refresh = on_refresh.clone();
            let mut draft = (*expense_draft).clone();
            spawn_local(async move {
                let result = tracker.0.create_expense(&mut draft).await;
                if let Some(cleared) = saved_draft(&result, draft) {
                    expense_draft.set(cleared);
                }
                report(result, &error);
                on_refresh.emit(());
            });
        })
    };

    let on_set_budget = {
        let tracker = props.tracker.clone();
        let budget_draft = budget_draft.clone();
        let error = error.clone();
        let on_refresh = props.on_refresh.clone();
        Callback::from(move |_| {
            let tracker = tracker.clone();
            let budget_draft = budget_draft.clone();
            let error = error.clone();
            let on_refresh = on_refresh.clone();
            let mut draft = (*budget_draft).clone();
            spawn_local(async move {
                let result = tracker.0.set_budget(&mut draft).await;
                if let Some(cleared) = saved_draft(&result, draft) {
                    budget_draft.set(cleared);
                }
                report(result, &error);
                on_refresh.emit(());
            });
        })
    };

    let on_logout = {
        let on_logout = props.on_logout.clone();
        Callback::from(move |_| on_logout.emit(()))
    };

    let bars = to_bar_series(&props.records.summaries);
    let pie = to_pie_series(&props.records.expenses);

    html! {
        <div class="p-6 max-w-5xl mx-auto space-y-6">
            <div class="flex items-center justify-between pb-4 border-b border-border">
                <h1 class="text-2xl font-bold text-foreground">{"Expense Tracker"}</h1>
                <button onclick={on_logout} class="flex items-center gap-2 px-4 py-2 rounded-lg text-sm">
                    { icon_log_out() }
                    <span>{"Logout"}</span>
                </button>
            </div>

            if let Some(msg) = &*error {
                <div class="text-sm text-red-500">{ msg.clone() }</div>
            }

            <section class="bg-card p-6 rounded-[10px] border border-border space-y-3">
                <h3 class="text-lg font-bold text-foreground">{"Add Expense"}</h3>
                <div class="grid grid-cols-1 md:grid-cols-4 gap-3">
                    <input placeholder="Amount" class="px-3 py-2 border border-input rounded-lg"
                        value={expense_draft.amount.clone()}
                        oninput={bind(&expense_draft, |d, v| d.amount = v)} />
                    <input placeholder="Category" class="px-3 py-2 border border-input rounded-lg"
                        value={expense_draft.category.clone()}
                        oninput={bind(&expense_draft, |d, v| d.category = v)} />
                    <input placeholder="Description" class="px-3 py-2 border border-input rounded-lg"
                        value={expense_draft.description.clone()}
                        oninput={bind(&expense_draft, |d, v| d.description = v)} />
                    <input type="date" class="px-3 py-2 border border-input rounded-lg"
                        value={expense_draft.date.clone()}
                        oninput={bind(&expense_draft, |d, v| d.date = v)} />
                </div>
                <button onclick={on_add_expense} class="flex items-center gap-2 bg-primary text-primary-foreground px-4 py-2 rounded-lg">
                    { icon_plus() }
                    <span>{"Add Expense"}</span>
                </button>
            </section>

            <section class="bg-card p-6 rounded-[10px] border border-border space-y-3">
                <h3 class="text-lg font-bold text-foreground">{"Set Budget"}</h3>
                <div class="grid grid-cols-1 md:grid-cols-2 gap-3">
                    <input placeholder="Category" class="px-3 py-2 border border-input rounded-lg"
                        value={budget_draft.category.clone()}
                        oninput={bind(&budget_draft, |d, v| d.category = v)} />
                    <input placeholder="Budget Amount" class="px-3 py-2 border border-input rounded-lg"
                        value={budget_draft.amount.clone()}
                        oninput={bind(&budget_draft, |d, v| d.amount = v)} />
                </div>
                <button onclick={on_set_budget} class="flex items-center gap-2 bg-primary text-primary-foreground px-4 py-2 rounded-lg">
                    { icon_wallet() }
                    <span>{"Set Budget"}</span>
                </button>
            </section>

            <section class="bg-card p-6 rounded-[10px] border border-border">
                <h3 class="text-lg font-bold text-foreground mb-3">{"Expenses"}</h3>
                if props.records.expenses.is_empty() {
                    <p class="text-sm text-muted-foreground">{"No expenses yet."}</p>
                } else {
                    <ul class="text-sm space-y-1">
                        { for props.records.expenses.iter().map(|e| html! {
                            <li>
                                { format!("{} | {} | {} | {}", e.date, e.category, format_currency(e.amount), e.description) }
                            </li>
                        }) }
                    </ul>
                }
            </section>

            <section class="bg-card p-6 rounded-[10px] border border-border">
                <h3 class="text-lg font-bold text-foreground mb-3">{"Budget Summary"}</h3>
                <ul class="text-sm space-y-1">
                    { for props.records.summaries.iter().map(|s| html! {
                        <li>
                            { format!(
                                "{}: Budget {}, Spent {}, Remaining {}",
                                s.category,
                                format_currency(s.budget),
                                format_currency(s.spent),
                                format_currency(s.remaining),
                            ) }
                        </li>
                    }) }
                </ul>
            </section>

            <section class="bg-card p-6 rounded-[10px] border border-border">
                <h3 class="text-lg font-bold text-foreground mb-3">{"Spending vs Budget"}</h3>
                <BarChart data={bars} />
            </section>

            <section class="bg-card p-6 rounded-[10px] border border-border">
                <h3 class="text-lg font-bold text-foreground mb-3">{"Expenses by Category"}</h3>
                <PieChart data={pie} />
            </section>
        </div>
    }
}

/// The draft to write back into the form once a submission settles. Only a
/// saved draft comes back (already cleared); otherwise the form keeps
/// whatever was typed while the request was in flight.
fn saved_draft<T>(
    result: &expense_tracker_frontend::ClientResult<Submission>,
    draft: T,
) -> Option<T> {
    matches!(result, Ok(Submission::Saved(_))).then_some(draft)
}

fn report(
    result: expense_tracker_frontend::ClientResult<Submission>,
    error: &UseStateHandle<Option<String>>,
) {
    match result {
        Ok(Submission::Saved(_)) => error.set(None),
        Ok(Submission::Skipped) => {}
        Err(err) => error.set(Some(err.to_string())),
    }
}

#[derive(Properties, PartialEq)]
struct BarChartProps {
    data: Vec<BarDatum>,
}

#[function_component(BarChart)]
fn bar_chart(props: &BarChartProps) -> Html {
    let max = props
        .data
        .iter()
        .map(|d| d.spent.max(d.budget))
        .fold(0.0_f64, f64::max);
    let width = |value: f64| {
        if max > 0.0 {
            format!("width: {:.1}%", value / max * 100.0)
        } else {
            "width: 0%".to_string()
        }
    };

    html! {
        <div class="space-y-3">
            { for props.data.iter().map(|d| html! {
                <div>
                    <p class="text-sm font-medium text-foreground">{ d.category.clone() }</p>
                    <div class="h-3 bg-[#8884d8] rounded" style={width(d.spent)}
                        title={format!("Spent {}", format_currency(d.spent))}></div>
                    <div class="h-3 mt-1 bg-[#82ca9d] rounded" style={width(d.budget)}
                        title={format!("Budget {}", format_currency(d.budget))}></div>
                </div>
            }) }
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct PieChartProps {
    data: Vec<PieDatum>,
}

#[function_component(PieChart)]
fn pie_chart(props: &PieChartProps) -> Html {
    let total = series_total(&props.data);
    if total <= 0.0 {
        return html! { <p class="text-sm text-muted-foreground">{"Nothing to chart yet."}</p> };
    }

    let mut start = 0.0_f64;
    let slices = props.data.iter().enumerate().map(|(index, datum)| {
        let share = datum.share(total);
        let color = COLORS[index % COLORS.len()];
        let end = start + share;
        let shape = if share >= 1.0 {
            html! { <circle cx="100" cy="100" r="100" fill={color} /> }
        } else {
            html! { <path d={arc_path(start, end)} fill={color} /> }
        };
        start = end;
        shape
    });
    let slices: Vec<Html> = slices.collect();

    html! {
        <div class="flex items-center gap-8">
            <svg width="200" height="200" viewBox="0 0 200 200">
                { for slices }
            </svg>
            <ul class="text-sm space-y-1">
                { for props.data.iter().enumerate().map(|(index, datum)| html! {
                    <li class="flex items-center gap-2">
                        <span class="inline-block w-3 h-3 rounded-full"
                            style={format!("background: {}", COLORS[index % COLORS.len()])}></span>
                        { format!("{} {} ({:.0}%)", datum.category, format_currency(datum.total), datum.share(total) * 100.0) }
                    </li>
                }) }
            </ul>
        </div>
    }
}

/// SVG path for the wedge between two fractions of a full turn.
fn arc_path(from: f64, to: f64) -> String {
    let point = |fraction: f64| {
        let angle = fraction * std::f64::consts::TAU - std::f64::consts::FRAC_PI_2;
        (100.0 + 100.0 * angle.cos(), 100.0 + 100.0 * angle.sin())
    };
    let (x1, y1) = point(from);
    let (x2, y2) = point(to);
    let large = if to - from > 0.5 { 1 } else { 0 };
    format!(
        "M100,100 L{:.3},{:.3} A100,100 0 {} 1 {:.3},{:.3} Z",
        x1, y1, large, x2, y2
    )
}

fn format_with_commas(value: u64) -> String {
    let s = value.to_string().chars().rev().collect::<Vec<char>>();
    let mut out = Vec::new();
    for (i, ch) in s.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(*ch);
    }
    out.into_iter().rev().collect()
}

fn format_currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as u64;
    format!(
        "{}{}{}.{:02}",
        sign,
        CURRENCY_SYMBOL,
        format_with_commas(cents / 100),
        cents % 100
    )
}

fn icon_base(path: &'static str) -> Html {
    html! {
        <svg width="20" height="20" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round">
            <path d={path}></path>
        </svg>
    }
}

fn icon_wallet() -> Html {
    icon_base("M3 7h18v10H3zM16 7V5H5v2")
}
fn icon_log_out() -> Html {
    icon_base("M9 21H5a2 2 0 01-2-2V5a2 2 0 012-2h4M16 17l5-5-5-5M21 12H9")
}
fn icon_plus() -> Html {
    icon_base("M12 5v14M5 12h14")
}

fn main() {
    telemetry::init();
    yew::Renderer::<App>::new().render();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1234.5), "₹1,234.50");
        assert_eq!(format_currency(0.0), "₹0.00");
        assert_eq!(format_currency(-30.0), "-₹30.00");
    }

    #[test]
    fn test_only_saved_drafts_are_written_back() {
        use expense_tracker_frontend::{ClientError, ReloadOutcome};

        let saved = Ok(Submission::Saved(ReloadOutcome::NoSession));
        assert_eq!(
            saved_draft(&saved, ExpenseDraft::default()),
            Some(ExpenseDraft::default())
        );

        let stale = BudgetDraft {
            category: "Food".into(),
            amount: "10".into(),
        };
        let failed = Err(ClientError::Network("offline".into()));
        assert_eq!(saved_draft(&failed, stale.clone()), None);
        assert_eq!(saved_draft(&Ok(Submission::Skipped), stale), None);
    }

    #[test]
    fn test_arc_path_quarter() {
        let path = arc_path(0.0, 0.25);
        assert!(path.starts_with("M100,100 L100.000,0.000"));
        assert!(path.contains(" 0 1 200.000,100.000"));
    }
}
