//! Templated advice generators
//!
//! Each generator is a pure function of the scenario, its metrics, and the
//! detected [`SubIntent`]. Thresholds pick the tone, the sub-intent picks the
//! variant. Output is opaque markup (`<strong>`, `<br>`) for the caller to
//! render.

use super::format::{escape_markup, group_thousands, one_decimal, rupees, runway_label, whole};
use super::intent::{asks_for_break_even_point, detect_sub_intent, IntentCategory, SubIntent};
use crate::engine::{ENGINEER_MONTHLY_SALARY, PRICE_SWEET_SPOT};
use crate::models::{FinancialMetrics, RichText, ScenarioInput};

const UNDERPRICED_BELOW: f64 = 400.0;
const OVERPRICED_ABOVE: f64 = 600.0;
const WEAK_MARKETING_ROI: f64 = 2.0;
const STRONG_MARKETING_ROI: f64 = 4.0;
/// Ticket size assumed when sizing new-customer targets
const REFERENCE_DEAL_SIZE: f64 = 5_000.0;

const GREETINGS: &[&str] = &[
    "👋 Hello! I'm your CFO AI Assistant, ready to help with financial strategy!",
    "🤖 Hi there! Let's dive into your financial data and find opportunities!",
    "💼 Hey! I'm here to help you make smarter financial decisions.",
    "🎯 Hello! Ready to optimize your business finances together?",
];

const THANK_YOU_REPLIES: &[&str] = &[
    "🙏 You're welcome! Happy to help optimize your business finances!",
    "😊 Glad I could help! Feel free to ask more questions anytime.",
    "💼 My pleasure! Strategic financial planning is what I do best.",
    "🎯 Anytime! I'm here whenever you need financial insights.",
];

/// Small builder for advice markup
struct Reply(String);

impl Reply {
    fn titled(icon: &str, title: impl AsRef<str>) -> Self {
        Self(format!("{} <strong>{}</strong><br><br>", icon, title.as_ref()))
    }

    /// One-line headline followed directly by bullets
    fn headline(icon: &str, label: &str, text: impl AsRef<str>) -> Self {
        Self(format!("{} <strong>{}:</strong> {}<br>", icon, label, text.as_ref()))
    }

    fn plain(text: impl AsRef<str>) -> Self {
        Self(format!("{}<br><br>", text.as_ref()))
    }

    fn para(mut self, text: impl AsRef<str>) -> Self {
        self.0.push_str(text.as_ref());
        self.0.push_str("<br><br>");
        self
    }

    fn line(mut self, text: impl AsRef<str>) -> Self {
        self.0.push_str(text.as_ref());
        self.0.push_str("<br>");
        self
    }

    fn section(mut self, title: &str) -> Self {
        self.0.push_str(&format!("<strong>{}:</strong><br>", title));
        self
    }

    fn bullet(mut self, text: impl AsRef<str>) -> Self {
        self.0.push_str("• ");
        self.0.push_str(text.as_ref());
        self.0.push_str("<br>");
        self
    }

    fn gap(mut self) -> Self {
        self.0.push_str("<br>");
        self
    }

    fn finish(self) -> RichText {
        RichText::new(self.0.trim_end_matches("<br>"))
    }
}

/// Render the answer for an already-classified question
pub fn respond(
    category: IntentCategory,
    query: &str,
    input: &ScenarioInput,
    metrics: &FinancialMetrics,
) -> RichText {
    let sub = detect_sub_intent(category, query);

    match category {
        IntentCategory::Runway => runway_advice(input, metrics, sub),
        IntentCategory::Hiring => hiring_advice(input, metrics),
        IntentCategory::Pricing => pricing_advice(input, metrics),
        IntentCategory::Marketing => marketing_advice(input, metrics),
        IntentCategory::CashFlow => cash_flow_advice(input, metrics, sub),
        IntentCategory::Profit => profit_advice(input, metrics, sub),
        IntentCategory::BreakEven => break_even_advice(input, metrics, sub, query),
        IntentCategory::Greeting => greeting(variant_index(query, GREETINGS.len())),
        IntentCategory::Help => help(),
        IntentCategory::Thanks => thanks(variant_index(query, THANK_YOU_REPLIES.len())),
        IntentCategory::General => general_advice(input, metrics, sub, query),
    }
}

/// Stable pick among canned variants so equal questions get equal answers
fn variant_index(query: &str, variants: usize) -> usize {
    let sum: usize = query.bytes().map(usize::from).sum();
    sum % variants.max(1)
}

//
// ================= Runway =================
//

pub fn runway_advice(input: &ScenarioInput, m: &FinancialMetrics, sub: SubIntent) -> RichText {
    let profit = rupees(m.monthly_profit);

    let Some(runway) = m.runway_months() else {
        return match sub {
            SubIntent::Duration => Reply::titled("🎉", "Unlimited Survival Time!")
                .para("Great question! Your business can survive <strong>indefinitely</strong> at current rates because you're profitable!")
                .section("You're making money")
                .bullet(format!("Monthly profit: {}", profit))
                .bullet(format!("Cash grows by {} every month", profit))
                .bullet("No survival concerns at current performance")
                .gap()
                .line("Focus on scaling and reinvestment! 🚀")
                .finish(),
            SubIntent::Meaning => Reply::titled("🎉", "\"Infinite Runway\" Explained!")
                .para("Your runway is <strong>infinite</strong> - here's what that means:")
                .section("Definition")
                .bullet("You're generating MORE money than you spend")
                .bullet(format!("Monthly profit: +{}", profit))
                .bullet("Your cash balance GROWS each month")
                .bullet("No risk of running out of money")
                .gap()
                .line("<strong>This is excellent!</strong> You can focus on growth and opportunities! 🎯")
                .finish(),
            _ => Reply::titled("🎉", "Excellent Runway Position!")
                .para("Your business has <strong>infinite runway</strong> - you're profitable!")
                .section("Current Performance")
                .bullet(format!("Monthly profit: {}", profit))
                .bullet(format!("Cash position: {}", rupees(input.current_cash)))
                .bullet("Status: Self-sustaining ✅")
                .gap()
                .line("Consider reinvesting profits for growth opportunities!")
                .finish(),
        };
    };

    let burn = rupees(m.burn_rate);
    let cash = rupees(input.current_cash);

    match sub {
        SubIntent::Duration => Reply::titled("⏰", format!("Survival Timeline: {} months", runway))
            .para(format!(
                "Based on your current burn rate, you can survive for <strong>{} months</strong> without additional funding.",
                runway
            ))
            .section("The math")
            .bullet(format!("Current cash: {}", cash))
            .bullet(format!("Monthly burn: {}", burn))
            .bullet(format!(
                "Survival formula: {} ÷ {} = {} months",
                group_thousands(whole(input.current_cash)),
                group_thousands(whole(m.burn_rate)),
                runway
            ))
            .gap()
            .line(if runway < 6 {
                "🚨 <strong>Action needed soon!</strong>"
            } else {
                "✅ <strong>Reasonable timeframe</strong>"
            })
            .finish(),
        SubIntent::Meaning => Reply::titled("📊", format!("\"{}-Month Runway\" Explained!", runway))
            .para("Runway means how long your business can operate before running out of cash.")
            .section("Your situation")
            .bullet(format!("You have {} months of cash left", runway))
            .bullet("Based on current spending vs income")
            .bullet(format!("Burning {}/month more than you make", burn))
            .gap()
            .line(format!(
                "<strong>Status:</strong> {}",
                if runway > 12 {
                    "✅ Healthy"
                } else if runway > 6 {
                    "⚠️ Monitor closely"
                } else {
                    "🚨 Needs attention"
                }
            ))
            .finish(),
        _ => Reply::titled("📈", format!("{}-Month Runway Analysis", runway))
            .para(format!("You have <strong>{} months</strong> of operational runway.", runway))
            .section("Financial Breakdown")
            .bullet(format!("Monthly burn rate: {}", burn))
            .bullet(format!("Current cash: {}", cash))
            .bullet(format!("Time remaining: {} months", runway))
            .gap()
            .line(if runway < 3 {
                "🚨 Critical - immediate action needed!"
            } else if runway < 6 {
                "⚠️ Start planning funding/cuts soon"
            } else {
                "✅ Good position to execute strategy"
            })
            .finish(),
    }
}

//
// ================= Hiring =================
//

pub fn hiring_advice(input: &ScenarioInput, m: &FinancialMetrics) -> RichText {
    let salary = rupees(ENGINEER_MONTHLY_SALARY);
    let burn_with_hire = m.burn_rate + ENGINEER_MONTHLY_SALARY;
    let runway_with_hire = input.current_cash / burn_with_hire;

    if m.runway < 6.0 {
        Reply::titled("🛑", "Hiring Not Recommended Right Now")
            .para(format!(
                "With only <strong>{} months runway</strong>, adding engineers is risky.",
                whole(m.runway)
            ))
            .section("Impact Analysis")
            .bullet(format!("Current team: {} engineers", input.engineers))
            .bullet(format!("Cost per new hire: {}/month", salary))
            .bullet(format!("New runway with 1 hire: ~{} months", whole(runway_with_hire)))
            .bullet(format!(
                "You'd lose {} months of runway",
                whole(m.runway - runway_with_hire)
            ))
            .gap()
            .section("Better Alternatives")
            .bullet("Hire freelancers/contractors for specific projects")
            .bullet("Focus existing team on revenue-generating features")
            .bullet("Wait until runway > 12 months")
            .bullet("Consider equity-only hires if desperate")
            .finish()
    } else if m.profit_margin > 15.0 && m.runway > 12.0 {
        Reply::titled("💚", "Good Time to Consider Hiring!")
            .line("Your financials support strategic hiring:")
            .bullet(format!("Profit margin: {}% (healthy)", one_decimal(m.profit_margin)))
            .bullet(format!("Current runway: {} (safe)", runway_label(m)))
            .bullet(format!("Current team: {} engineers", input.engineers))
            .gap()
            .section("Hiring Impact")
            .bullet(format!("Each new engineer costs {}/month", salary))
            .bullet(format!("New runway with 1 hire: ~{} months", whole(runway_with_hire)))
            .bullet(format!("Impact on monthly profit: -{}", salary))
            .gap()
            .section("Smart Hiring Strategy")
            .bullet("Hire revenue-focused engineers first")
            .bullet("Look for full-stack developers")
            .bullet("Set clear 3-month productivity goals")
            .bullet("Consider senior vs junior trade-offs")
            .finish()
    } else {
        Reply::titled("⚖️", "Hiring Requires Careful Planning")
            .para(format!(
                "Your current team size of <strong>{} engineers</strong> seems appropriate for now.",
                input.engineers
            ))
            .section("Current Financial Picture")
            .bullet(format!("Monthly burn: {}", rupees(m.burn_rate)))
            .bullet(format!("Profit margin: {}%", one_decimal(m.profit_margin)))
            .bullet(format!("Runway: {}", runway_label(m)))
            .gap()
            .section("Before Hiring, Consider")
            .bullet("Can current team be more productive?")
            .bullet("Will new hire directly increase revenue?")
            .bullet("Do you have 18+ months runway after hiring?")
            .bullet("Are you solving the right problems?")
            .gap()
            .section("Alternative Strategies")
            .bullet("Improve processes and tools first")
            .bullet("Outsource non-core functions")
            .bullet("Focus on product-market fit")
            .bullet("Hire when you have clear revenue impact")
            .finish()
    }
}

//
// ================= Pricing & Marketing =================
//

pub fn pricing_advice(input: &ScenarioInput, m: &FinancialMetrics) -> RichText {
    let price = rupees(input.product_price);
    let sweet_spot = rupees(PRICE_SWEET_SPOT);

    if input.product_price < UNDERPRICED_BELOW {
        Reply::headline(
            "📈",
            "Pricing Opportunity",
            format!("At {}, you're likely underpricing. Consider:", price),
        )
        .bullet(format!("Testing {} (sweet spot in our model)", sweet_spot))
        .bullet("A/B testing different price points")
        .bullet("Gradual increases of 10-20% quarterly")
        .bullet("Adding premium features to justify higher prices")
        .finish()
    } else if input.product_price > OVERPRICED_ABOVE {
        Reply::headline(
            "📉",
            "Pricing Analysis",
            format!("{} might be limiting your customer base. Consider:", price),
        )
        .bullet(format!("Testing lower price points around {}", sweet_spot))
        .bullet("Creating multiple pricing tiers")
        .bullet("Analyzing customer feedback on pricing")
        .bullet("Volume vs. margin optimization")
        .finish()
    } else {
        Reply::headline(
            "✅",
            "Good Pricing",
            format!("{} is in a healthy range. Your revenue potential looks good:", price),
        )
        .bullet(format!("Current monthly revenue: {}", rupees(m.monthly_revenue)))
        .bullet("Consider premium/enterprise tiers")
        .bullet("Monitor customer price sensitivity")
        .bullet("Test 10% increases quarterly")
        .finish()
    }
}

/// Revenue earned per rupee of marketing, `None` without marketing spend
pub fn marketing_roi(input: &ScenarioInput, m: &FinancialMetrics) -> Option<f64> {
    if input.marketing_spend > 0.0 {
        Some(m.monthly_revenue / input.marketing_spend)
    } else {
        None
    }
}

pub fn marketing_advice(input: &ScenarioInput, m: &FinancialMetrics) -> RichText {
    let spend = rupees(input.marketing_spend);

    let Some(roi) = marketing_roi(input, m) else {
        return Reply::headline(
            "📣",
            "No Marketing Spend",
            "With ₹0 in marketing, this model brings in no new users. Consider:",
        )
        .bullet("Starting with a small test budget (₹5,000-10,000)")
        .bullet("Measuring revenue per channel before scaling")
        .bullet("Leaning on referrals and organic content")
        .finish();
    };

    if roi < WEAK_MARKETING_ROI {
        Reply::headline(
            "📊",
            "Marketing ROI Alert",
            format!(
                "You're getting ₹{:.2} for every ₹1 spent on marketing. Recommendations:",
                roi
            ),
        )
        .bullet(format!("Reduce marketing spend from {}", spend))
        .bullet("Focus on higher-converting channels")
        .bullet("Improve customer acquisition cost (CAC)")
        .bullet("Consider organic growth strategies")
        .finish()
    } else if roi > STRONG_MARKETING_ROI {
        Reply::headline(
            "🚀",
            "Excellent Marketing ROI",
            format!("₹{:.2} return per ₹1 spent! Consider:", roi),
        )
        .bullet("Increasing marketing budget by 20-30%")
        .bullet("Scaling successful channels")
        .bullet("Testing new marketing channels")
        .bullet(format!("Current spend of {} could be increased", spend))
        .finish()
    } else {
        Reply::headline(
            "💼",
            "Decent Marketing Performance",
            format!("₹{:.2} ROI is acceptable. Optimization ideas:", roi),
        )
        .bullet("Track conversion rates by channel")
        .bullet("A/B test marketing messages")
        .bullet("Focus on customer lifetime value")
        .bullet(format!("Current {} seems reasonable", spend))
        .finish()
    }
}

//
// ================= Cash Flow =================
//

pub fn cash_flow_advice(_input: &ScenarioInput, m: &FinancialMetrics, sub: SubIntent) -> RichText {
    let profit = m.monthly_profit;
    let shortfall = rupees(profit.abs());
    let revenue = rupees(m.monthly_revenue);
    let expenses = rupees(m.total_monthly_expenses);
    let revenue_gap = rupees(m.total_monthly_expenses - m.monthly_revenue);
    let price_lift = rupees(m.monthly_revenue * 0.15);

    match sub {
        SubIntent::Status if profit > 0.0 => Reply::titled("✅", "YES - You Have Positive Cash Flow!")
            .para(format!(
                "Excellent question! Your cash flow is <strong>positive by {}/month</strong>!",
                rupees(profit)
            ))
            .section("What this means")
            .bullet("You make more than you spend each month")
            .bullet("Your business is self-sustaining")
            .bullet("Cash balance grows automatically")
            .bullet("No funding pressure")
            .gap()
            .section("Monthly Breakdown")
            .bullet(format!("Revenue: {}", revenue))
            .bullet(format!("Total costs: {}", expenses))
            .bullet(format!("Net profit: +{}", rupees(profit)))
            .gap()
            .line("Keep doing what you're doing! 🚀")
            .finish(),
        SubIntent::Status => Reply::titled("❌", "No - Cash Flow is Negative")
            .para(format!(
                "Your current cash flow is <strong>negative by {}/month</strong>.",
                shortfall
            ))
            .section("The situation")
            .bullet("You spend more than you earn")
            .bullet("Burning cash reserves each month")
            .bullet("Need to improve revenue or cut costs")
            .gap()
            .section("Monthly Numbers")
            .bullet(format!("Revenue: {}", revenue))
            .bullet(format!("Costs: {}", expenses))
            .bullet(format!("Shortfall: -{}", shortfall))
            .gap()
            .line("Focus on revenue growth or cost optimization!")
            .finish(),
        SubIntent::Improve if profit < 0.0 => Reply::titled("💡", "Cash Flow Improvement Strategy")
            .para(format!(
                "Great question! Here's how to fix your {}/month shortfall:",
                shortfall
            ))
            .section("Revenue Growth (Fastest Impact)")
            .bullet(format!("Increase prices by 15% → +{}/month", price_lift))
            .bullet("Improve marketing ROI by focusing on best channels")
            .bullet("Add upselling to existing customers")
            .bullet("Launch premium features or tiers")
            .gap()
            .section("Cost Optimization (Immediate)")
            .bullet("Cut non-essential spending")
            .bullet("Negotiate vendor rates")
            .bullet("Optimize team structure")
            .bullet("Reduce office/overhead costs")
            .gap()
            .line(format!(
                "<strong>Target:</strong> Need {}/month more revenue to break even.",
                revenue_gap
            ))
            .finish(),
        SubIntent::Improve => Reply::titled("✨", "Already Positive - Growth Ideas!")
            .para(format!(
                "You're already profitable ({}/month)! Here's how to grow further:",
                rupees(profit)
            ))
            .section("Scaling Opportunities")
            .bullet(format!("Reinvest {} back into growth", rupees(profit * 0.7)))
            .bullet("Increase marketing budget for customer acquisition")
            .bullet("Hire additional team members")
            .bullet("Expand to new markets")
            .gap()
            .section("Build cash reserves for")
            .bullet("Market expansion")
            .bullet("Product development")
            .bullet("Strategic opportunities")
            .bullet("Economic downturns")
            .finish(),
        _ if profit > 0.0 => Reply::titled("🎯", "Your Cash Flow is Positive!")
            .para(format!(
                "Great news! You're generating <strong>{}/month profit</strong>.",
                rupees(profit)
            ))
            .section("Current Performance")
            .bullet(format!("Monthly Revenue: {}", revenue))
            .bullet(format!("Monthly Expenses: {}", expenses))
            .bullet(format!("Net Profit: {}", rupees(profit)))
            .gap()
            .section("Optimization Opportunities")
            .bullet("Reinvest profits for faster growth")
            .bullet("Build emergency cash reserves")
            .bullet("Test premium pricing tiers")
            .bullet("Scale successful marketing channels")
            .bullet("Consider strategic hires for growth")
            .finish(),
        _ => Reply::titled("📈", "Cash Flow Improvement Strategy")
            .para(format!(
                "You need {}/month more revenue to break even.",
                revenue_gap
            ))
            .section("Revenue Acceleration (Priority 1)")
            .bullet("Test price increase from current levels by 15%")
            .bullet("Improve marketing ROI and conversion rates")
            .bullet("Focus on customer retention and upselling")
            .bullet("Expand to new market segments")
            .gap()
            .section("Cost Optimization (Priority 2)")
            .bullet("Review all monthly expenses")
            .bullet("Negotiate better rates with vendors")
            .bullet("Consider remote-first to reduce office costs")
            .bullet("Automate repetitive tasks")
            .gap()
            .section("Quick Wins")
            .bullet(format!("A 15% price increase could add {}/month", price_lift))
            .bullet("Better marketing could improve conversion by 20-30%")
            .bullet(format!(
                "Cost cuts of 10% save {}/month",
                rupees(m.total_monthly_expenses * 0.1)
            ))
            .finish(),
    }
}

//
// ================= Profit =================
//

pub fn profit_advice(_input: &ScenarioInput, m: &FinancialMetrics, sub: SubIntent) -> RichText {
    let margin = m.profit_margin;
    let margin_text = one_decimal(margin);

    match sub {
        SubIntent::Meaning => {
            let per_hundred = if margin > 0.0 {
                format!("keep ₹{} as profit", margin_text)
            } else {
                format!("lose ₹{}", one_decimal(margin.abs()))
            };
            let quality = if margin > 20.0 {
                "excellent"
            } else if margin > 10.0 {
                "good"
            } else if margin > 0.0 {
                "acceptable"
            } else {
                "concerning"
            };
            let benchmark = if margin > 20.0 {
                "🟢 Above average!"
            } else if margin > 10.0 {
                "🟡 Decent"
            } else if margin > 0.0 {
                "🟠 Below average"
            } else {
                "🔴 Needs improvement"
            };

            Reply::titled("📊", "Your Profit Margin Explained")
                .para(format!(
                    "Your current profit margin is <strong>{}%</strong>.",
                    margin_text
                ))
                .section("What this means")
                .bullet(format!("For every ₹100 in revenue, you {}", per_hundred))
                .bullet(format!("This is {}", quality))
                .gap()
                .section("Industry Context")
                .bullet("Tech startups: Usually 15-30%")
                .bullet("SaaS businesses: Often 20-40%")
                .bullet(format!("Your {}%: {}", margin_text, benchmark))
                .gap()
                .section("Calculation")
                .line(format!(
                    "({} profit ÷ {} revenue) × 100 = {}%",
                    rupees(m.monthly_profit),
                    rupees(m.monthly_revenue),
                    margin_text
                ))
                .finish()
        }
        SubIntent::Improve if margin < 0.0 => Reply::titled("🔧", "Turning Negative Margins Positive")
            .para(format!(
                "Your {}% margin needs immediate attention! Here's how:",
                margin_text
            ))
            .section("Revenue Improvements (Faster)")
            .bullet("Increase prices by 20% to lift revenue per sale")
            .bullet("Focus on premium customers")
            .bullet("Add high-margin services")
            .bullet("Reduce discounting")
            .gap()
            .section("Cost Reductions (Immediate)")
            .bullet("Cut non-essential expenses")
            .bullet("Negotiate vendor rates")
            .bullet("Optimize team efficiency")
            .bullet("Automate manual processes")
            .gap()
            .line("<strong>Target:</strong> Get to 15%+ margin for healthy growth.")
            .finish(),
        SubIntent::Improve => {
            let mut reply = Reply::titled("🚀", "Margin Improvement Strategies")
                .para(format!("Your {}% margin can be enhanced! Here's how:", margin_text))
                .section("Premium Positioning")
                .bullet("Test 10-15% price increase")
                .bullet("Add premium features/tiers")
                .bullet("Focus on value-based pricing")
                .bullet("Target higher-value customers")
                .gap()
                .section("Operational Efficiency")
                .bullet("Automate routine tasks")
                .bullet("Improve team productivity")
                .bullet("Optimize vendor contracts")
                .bullet("Reduce waste/overhead")
                .gap()
                .section("Potential Impact")
                .bullet(format!("15% price increase → {}% margin", one_decimal(margin + 15.0)));

            if m.monthly_revenue > 0.0 {
                let cost_cut_points = m.total_monthly_expenses * 0.1 / m.monthly_revenue * 100.0;
                reply = reply.bullet(format!(
                    "10% cost reduction → {}% margin",
                    one_decimal(margin + cost_cut_points)
                ));
            }
            reply.finish()
        }
        _ if margin < 0.0 => Reply::headline(
            "🔴",
            "Negative Profit Margin",
            format!("{}% means you're losing money. Priority actions:", margin_text),
        )
        .bullet("Reduce costs immediately")
        .bullet("Increase prices if market allows")
        .bullet("Focus on unit economics")
        .bullet("Consider pivoting if trend continues")
        .line(format!("Current loss: {}/month", rupees(m.monthly_profit.abs())))
        .finish(),
        _ if margin < 10.0 => Reply::headline(
            "🟡",
            "Low Profit Margin",
            format!("{}% is concerning. Improve by:", margin_text),
        )
        .bullet("Raising prices by 15-20%")
        .bullet("Reducing operational costs")
        .bullet("Improving product efficiency")
        .bullet("Focus on high-value customers")
        .finish(),
        _ if margin > 25.0 => Reply::headline(
            "🟢",
            "Excellent Margins",
            format!("{}% is outstanding! You can:", margin_text),
        )
        .bullet("Invest in growth (marketing, hiring)")
        .bullet("Build competitive moats")
        .bullet("Consider market expansion")
        .bullet("Maintain pricing power")
        .finish(),
        _ => Reply::headline(
            "✅",
            "Healthy Margins",
            format!("{}% is solid. Continue:", margin_text),
        )
        .bullet("Monitoring unit economics")
        .bullet("Gradual price optimization")
        .bullet("Cost efficiency improvements")
        .bullet("Strategic growth investments")
        .finish(),
    }
}

//
// ================= Break-even =================
//

/// Months of compound monthly growth needed to lift revenue to expenses
fn months_to_close_gap(current: f64, target: f64, monthly_growth: f64) -> i64 {
    whole((target / current).ln() / (1.0 + monthly_growth).ln())
}

pub fn break_even_advice(
    input: &ScenarioInput,
    m: &FinancialMetrics,
    sub: SubIntent,
    query: &str,
) -> RichText {
    let revenue = m.monthly_revenue;
    let expenses = m.total_monthly_expenses;

    if m.is_profitable() {
        let profit = rupees(m.monthly_profit);
        return if asks_for_break_even_point(query) {
            Reply::titled("🎉", "You're Already Past Break-Even!")
                .para(format!(
                    "Great question! You've already achieved profitability and are generating <strong>{}/month profit</strong>.",
                    profit
                ))
                .section("Your Achievement")
                .bullet(format!("Monthly Revenue: {}", rupees(revenue)))
                .bullet(format!("Monthly Costs: {}", rupees(expenses)))
                .bullet(format!("Net Profit: +{}", profit))
                .gap()
                .section("Now Focus On")
                .bullet("Scaling profitable operations")
                .bullet("Reinvesting in growth")
                .bullet("Building cash reserves")
                .bullet("Expanding market share")
                .finish()
        } else {
            Reply::headline(
                "🎉",
                "Already Profitable!",
                format!("You're generating {}/month profit. Focus on:", profit),
            )
            .bullet("Scaling profitable operations")
            .bullet("Reinvesting in growth")
            .bullet("Building cash reserves")
            .bullet("Expanding market share")
            .finish()
        };
    }

    if m.monthly_profit == 0.0 {
        return Reply::titled("⚖️", "Exactly at Break-Even")
            .para(format!(
                "Revenue and expenses both sit at <strong>{}/month</strong>.",
                rupees(revenue)
            ))
            .section("Next Steps")
            .bullet("Any new revenue now goes straight to profit")
            .bullet("Hold costs flat while growth kicks in")
            .bullet("Small price tests carry little downside")
            .finish();
    }

    let gap = expenses - revenue;
    let months_of_cash = whole(input.current_cash / m.monthly_profit.abs());

    match sub {
        SubIntent::Timeline => {
            let mut reply = Reply::titled("⏱️", "Break-Even Timeline Analysis")
                .para("At current rates, you need to increase revenue to reach break-even:")
                .section("Current Situation")
                .bullet(format!("Monthly Revenue: {}", rupees(revenue)))
                .bullet(format!("Monthly Expenses: {}", rupees(expenses)))
                .bullet(format!("Revenue Gap: {}/month", rupees(gap)))
                .gap()
                .section("Time Scenarios");

            reply = if revenue > 0.0 {
                reply
                    .bullet(format!(
                        "With 20% monthly growth: {} months",
                        months_to_close_gap(revenue, expenses, 0.2)
                    ))
                    .bullet(format!(
                        "With 10% monthly growth: {} months",
                        months_to_close_gap(revenue, expenses, 0.1)
                    ))
                    .bullet("At current growth: Need immediate revenue increase")
            } else {
                reply.bullet("No revenue yet: growth rates can't close the gap until the first sales land")
            };

            reply
                .gap()
                .line(format!("You have {} months of cash to achieve this!", months_of_cash))
                .finish()
        }
        SubIntent::HowTo => {
            let uplift = if revenue > 0.0 {
                format!("{}%", whole(gap / revenue * 100.0))
            } else {
                "enough to start generating revenue".to_string()
            };

            Reply::titled("🎯", "How to Reach Break-Even")
                .para(format!(
                    "You need {}/month more revenue to break even. Here's how:",
                    rupees(gap)
                ))
                .section("Option 1 - Revenue Growth")
                .bullet(format!("Increase prices by {}", uplift))
                .bullet(format!(
                    "Acquire {} new {} customers",
                    whole(gap / REFERENCE_DEAL_SIZE),
                    rupees(REFERENCE_DEAL_SIZE)
                ))
                .bullet(format!("Improve conversion rate by {}", uplift))
                .gap()
                .section("Option 2 - Cost Reduction")
                .bullet(format!("Cut expenses by {}/month", rupees(gap)))
                .bullet(format!("Optimize team size (current: {} engineers)", input.engineers))
                .bullet("Reduce marketing spend if ROI is low")
                .gap()
                .section("Hybrid Approach (Recommended)")
                .bullet(format!("Increase revenue by {} (70%)", rupees(gap * 0.7)))
                .bullet(format!("Reduce costs by {} (30%)", rupees(gap * 0.3)))
                .finish()
        }
        _ => Reply::titled("📊", "Path to Break-Even")
            .para(format!(
                "You need to increase monthly revenue to {} to break even.",
                rupees(expenses)
            ))
            .section("Current Gap")
            .bullet(format!("Current revenue: {}", rupees(revenue)))
            .bullet(format!("Target revenue: {}", rupees(expenses)))
            .bullet(format!("Gap to close: {}", rupees(gap)))
            .gap()
            .section("Key Actions")
            .bullet("Focus on sales and customer acquisition")
            .bullet("Optimize pricing strategy")
            .bullet("Improve product-market fit")
            .bullet("Consider cost optimization")
            .finish(),
    }
}

//
// ================= General & Conversational =================
//

/// Short observations used by the health check
pub fn health_insights(input: &ScenarioInput, m: &FinancialMetrics) -> Vec<&'static str> {
    let mut insights = Vec::new();
    if m.runway < 6.0 {
        insights.push("🚨 Short runway - focus on extending cash");
    }
    if m.profit_margin > 20.0 {
        insights.push("✅ Excellent margins - consider scaling");
    }
    if input.engineers > 5 {
        insights.push("👥 Large team - monitor productivity");
    }
    if m.monthly_revenue < 50_000.0 {
        insights.push("📈 Focus on revenue growth");
    }
    insights
}

pub fn general_advice(
    input: &ScenarioInput,
    m: &FinancialMetrics,
    sub: SubIntent,
    query: &str,
) -> RichText {
    if sub == SubIntent::Question {
        return Reply::titled("🤔", "I'd love to help with that question!")
            .para(format!("I noticed you asked: \"{}\"", escape_markup(query)))
            .section("Based on your current financials")
            .bullet(format!("Runway: {}", runway_label(m)))
            .bullet(format!(
                "Monthly Status: {} of {}",
                if m.is_profitable() { "Profit" } else { "Loss" },
                rupees(m.monthly_profit.abs())
            ))
            .bullet(format!("Burn Rate: {}/month", rupees(m.burn_rate)))
            .gap()
            .section("Try asking me about")
            .bullet("\"What does my runway mean?\"")
            .bullet("\"Should I hire more engineers?\"")
            .bullet("\"How can I improve cash flow?\"")
            .bullet("\"Is my pricing strategy good?\"")
            .bullet("\"What's my break-even point?\"")
            .gap()
            .line("I analyze your real financial data to give personalized advice! 💡")
            .finish();
    }

    let mut reply = Reply::titled("🤖", "Financial Health Check")
        .para("Here's what I see in your current situation:")
        .section("Key Metrics")
        .bullet(format!("Runway: {}", runway_label(m)))
        .bullet(format!("Profit Margin: {}%", one_decimal(m.profit_margin)))
        .bullet(format!("Monthly Revenue: {}", rupees(m.monthly_revenue)))
        .bullet(format!("Team Size: {} engineers", input.engineers))
        .gap()
        .section("Key Insights");

    let insights = health_insights(input, m);
    if insights.is_empty() {
        reply = reply.bullet("Your financials look reasonably balanced");
    }
    for insight in insights {
        reply = reply.bullet(insight);
    }

    reply
        .gap()
        .section("Ask me specific questions like")
        .bullet("\"What should I focus on first?\"")
        .bullet("\"How risky is hiring right now?\"")
        .bullet("\"Should I raise prices?\"")
        .gap()
        .line("I'm here to help with strategic financial decisions! 🎯")
        .finish()
}

pub fn greeting(variant: usize) -> RichText {
    Reply::plain(GREETINGS[variant % GREETINGS.len()])
        .section("I can help you with")
        .bullet("💰 Runway and cash flow analysis")
        .bullet("👥 Hiring decisions and team planning")
        .bullet("📈 Pricing and revenue optimization")
        .bullet("🎯 Marketing budget allocation")
        .bullet("📊 Break-even and profitability planning")
        .gap()
        .line("What would you like to know about your business finances?")
        .finish()
}

pub fn help() -> RichText {
    Reply::titled("🆘", "Here's how I can help you!")
        .para("I'm your intelligent CFO assistant that analyzes your real financial data to provide personalized advice.")
        .section("🔍 What I analyze")
        .bullet("Your current cash position and runway")
        .bullet("Monthly revenue and expenses")
        .bullet("Team size and hiring costs")
        .bullet("Pricing strategy effectiveness")
        .bullet("Marketing ROI and efficiency")
        .gap()
        .section("💡 Questions you can ask")
        .bullet("\"What does my runway mean?\"")
        .bullet("\"Should I hire more engineers?\"")
        .bullet("\"How can I improve profitability?\"")
        .bullet("\"Is my pricing strategy working?\"")
        .bullet("\"What's my break-even point?\"")
        .bullet("\"How should I allocate my marketing budget?\"")
        .gap()
        .section("🎯 My responses include")
        .bullet("Specific recommendations based on YOUR data")
        .bullet("Risk assessments and warnings")
        .bullet("Actionable next steps")
        .bullet("Financial projections and scenarios")
        .gap()
        .line("Try the quick question buttons below or ask me anything! 🚀")
        .finish()
}

pub fn thanks(variant: usize) -> RichText {
    Reply::plain(THANK_YOU_REPLIES[variant % THANK_YOU_REPLIES.len()])
        .line("<strong>💡 Pro tip:</strong> Keep monitoring these key metrics weekly:")
        .bullet("Runway and burn rate")
        .bullet("Customer acquisition cost")
        .bullet("Monthly recurring revenue")
        .bullet("Profit margins")
        .gap()
        .line("Ask me again after any major business changes! 📊")
        .finish()
}

//
// ================= Tests =================
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::intent::classify_intent;
    use crate::engine::compute_metrics;

    fn profitable_input() -> ScenarioInput {
        ScenarioInput {
            monthly_spending: 10_000.0,
            engineers: 1,
            product_price: 500.0,
            marketing_spend: 100_000.0,
            current_cash: 250_000.0,
        }
    }

    /// Loss-making scenario with roughly eight months of runway
    fn moderate_runway_input() -> ScenarioInput {
        let base = ScenarioInput::default();
        let burn = compute_metrics(&base).burn_rate;
        ScenarioInput {
            current_cash: burn * 8.0,
            ..base
        }
    }

    fn answer(query: &str, input: &ScenarioInput) -> String {
        let metrics = compute_metrics(input);
        respond(classify_intent(query), query, input, &metrics).into_string()
    }

    #[test]
    fn test_hiring_discouraged_on_short_runway() {
        let text = answer("should I hire more engineers", &ScenarioInput::default());

        assert!(text.contains("Hiring Not Recommended Right Now"));
        assert!(text.contains("<strong>2 months runway</strong>"));
        assert!(text.contains("Current team: 4 engineers"));
        // 600_000 / (283_900 + 80_000) ≈ 1.65
        assert!(text.contains("New runway with 1 hire: ~2 months"));
    }

    #[test]
    fn test_hiring_encouraged_when_profitable() {
        let text = answer("should I hire more engineers", &profitable_input());

        assert!(text.contains("Good Time to Consider Hiring!"));
        assert!(text.contains("Profit margin: 62.0% (healthy)"));
        assert!(text.contains("∞ (Profitable!)"));
    }

    #[test]
    fn test_hiring_cautious_in_between() {
        let text = answer("grow the team?", &moderate_runway_input());
        assert!(text.contains("Hiring Requires Careful Planning"));
        assert!(text.contains("Runway: 8 months"));
    }

    #[test]
    fn test_runway_variants_for_loss() {
        let input = ScenarioInput::default();

        let duration = answer("how long will I survive", &input);
        assert!(duration.contains("Survival Timeline: 2 months"));
        assert!(duration.contains("600,000 ÷ 283,900 = 2 months"));
        assert!(duration.contains("Action needed soon!"));

        let meaning = answer("what does my runway mean", &input);
        assert!(meaning.contains("\"2-Month Runway\" Explained!"));
        assert!(meaning.contains("Needs attention"));

        let overview = answer("runway", &input);
        assert!(overview.contains("2-Month Runway Analysis"));
        assert!(overview.contains("Critical - immediate action needed!"));
    }

    #[test]
    fn test_runway_variants_when_profitable() {
        let input = profitable_input();
        assert!(answer("how long can we survive", &input).contains("Unlimited Survival Time!"));
        assert!(answer("what is runway", &input).contains("\"Infinite Runway\" Explained!"));
        assert!(answer("runway", &input).contains("Cash position: ₹250,000"));
    }

    #[test]
    fn test_pricing_thresholds() {
        let cheap = ScenarioInput {
            product_price: 300.0,
            ..ScenarioInput::default()
        };
        let pricey = ScenarioInput {
            product_price: 800.0,
            ..ScenarioInput::default()
        };

        assert!(answer("is my price right", &cheap).contains("Pricing Opportunity"));
        assert!(answer("is my price right", &pricey).contains("Pricing Analysis"));

        let fair = answer("is my price right", &ScenarioInput::default());
        assert!(fair.contains("Good Pricing"));
        assert!(fair.contains("Current monthly revenue: ₹89,100"));
    }

    #[test]
    fn test_marketing_roi_thresholds() {
        // 89_100 / 18_000 = 4.95
        let strong = answer("marketing", &ScenarioInput::default());
        assert!(strong.contains("Excellent Marketing ROI"));
        assert!(strong.contains("₹4.95 return per ₹1 spent"));

        let weak = ScenarioInput {
            product_price: 150.0,
            ..ScenarioInput::default()
        };
        // 180 * 150 * 1.7 = 45_900 / 18_000 = 2.55
        assert!(answer("marketing", &weak).contains("Decent Marketing Performance"));

        let poor = ScenarioInput {
            product_price: 50.0,
            ..ScenarioInput::default()
        };
        // 180 * 50 * 1.9 = 17_100 / 18_000 = 0.95
        assert!(answer("marketing", &poor).contains("Marketing ROI Alert"));
    }

    #[test]
    fn test_marketing_without_spend() {
        let input = ScenarioInput {
            marketing_spend: 0.0,
            ..ScenarioInput::default()
        };
        let metrics = compute_metrics(&input);
        assert_eq!(marketing_roi(&input, &metrics), None);
        assert!(answer("advertising plan", &input).contains("No Marketing Spend"));
    }

    #[test]
    fn test_cash_flow_variants() {
        let loss = ScenarioInput::default();
        assert!(answer("is my cash flow positive", &loss).contains("No - Cash Flow is Negative"));
        let improve = answer("how do I improve", &loss);
        assert!(improve.contains("₹283,900/month shortfall"));
        assert!(improve.contains("Need ₹283,900/month more revenue"));
        assert!(answer("cash flow", &loss).contains("Cost cuts of 10% save ₹37,300/month"));

        let profit = profitable_input();
        assert!(answer("is my cash flow good", &profit).contains("YES - You Have Positive Cash Flow!"));
        assert!(answer("optimize things", &profit).contains("Your Cash Flow is Positive!"));
        assert!(answer("what could be better", &profit).contains("Already Positive - Growth Ideas!"));
    }

    #[test]
    fn test_profit_variants() {
        let loss = ScenarioInput::default();
        let meaning = answer("what is my margin", &loss);
        assert!(meaning.contains("<strong>-318.6%</strong>"));
        assert!(meaning.contains("lose ₹318.6"));
        assert!(meaning.contains("Needs improvement"));

        assert!(answer("increase margin", &loss).contains("Turning Negative Margins Positive"));
        assert!(answer("money", &loss).contains("Current loss: ₹283,900/month"));

        let profit = profitable_input();
        assert!(answer("profit", &profit).contains("Excellent Margins"));
        let improve = answer("increase profit", &profit);
        assert!(improve.contains("15% price increase → 77.0% margin"));
        // 62 + 19_000 / 500_000 * 100 = 65.8
        assert!(improve.contains("10% cost reduction → 65.8% margin"));
    }

    #[test]
    fn test_break_even_variants() {
        let loss = ScenarioInput::default();

        let timeline = answer("when do we break even", &loss);
        assert!(timeline.contains("Revenue Gap: ₹283,900/month"));
        // ln(373000/89100)/ln(1.2) ≈ 7.85
        assert!(timeline.contains("With 20% monthly growth: 8 months"));
        assert!(timeline.contains("With 10% monthly growth: 15 months"));
        assert!(timeline.contains("You have 2 months of cash"));

        let how = answer("how to achieve breakeven", &loss);
        assert!(how.contains("Increase prices by 319%"));
        assert!(how.contains("Acquire 57 new ₹5,000 customers"));

        assert!(answer("breakeven", &loss).contains("Path to Break-Even"));

        let profit = profitable_input();
        assert!(answer("when do we break even", &profit).contains("Already Past Break-Even"));
        assert!(answer("break-even?", &profit).contains("Already Past Break-Even"));
        assert!(answer("breakeven", &profit).contains("Already Profitable!"));
        assert!(answer("how do I break even", &profit).contains("Already Past Break-Even"));

        let timed = answer("what time until breakeven", &profit);
        assert!(timed.contains("Already Profitable!"));
        assert!(!timed.contains("Already Past Break-Even"));
    }

    #[test]
    fn test_general_question_echoes_escaped_query() {
        let text = answer("why is the sky <blue>?", &ScenarioInput::default());
        assert!(text.contains("I noticed you asked: \"why is the sky &lt;blue&gt;?\""));
        assert!(text.contains("Monthly Status: Loss of ₹283,900"));
    }

    #[test]
    fn test_health_check_lists_insights() {
        let text = answer("status report", &ScenarioInput::default());
        assert!(text.contains("Financial Health Check"));
        assert!(text.contains("Short runway"));
        assert!(!text.contains("reasonably balanced"));
    }

    #[test]
    fn test_conversational_replies_are_stable() {
        let input = ScenarioInput::default();
        assert_eq!(answer("hello", &input), answer("hello", &input));
        assert!(answer("hello", &input).contains("I can help you with"));
        assert!(answer("help", &input).contains("Here's how I can help you!"));
        assert!(answer("thanks!", &input).contains("Pro tip"));
    }

    #[test]
    fn test_every_category_renders_for_both_regimes() {
        let categories = [
            IntentCategory::Runway,
            IntentCategory::Hiring,
            IntentCategory::Pricing,
            IntentCategory::Marketing,
            IntentCategory::CashFlow,
            IntentCategory::Profit,
            IntentCategory::BreakEven,
            IntentCategory::Greeting,
            IntentCategory::Help,
            IntentCategory::Thanks,
            IntentCategory::General,
        ];

        for input in [ScenarioInput::default(), profitable_input()] {
            let metrics = compute_metrics(&input);
            for category in categories {
                let text = respond(category, "", &input, &metrics).into_string();
                assert!(!text.is_empty(), "{}", category);
                assert!(!text.ends_with("<br>"), "{}", category);
                assert!(!text.contains("NaN"), "{}", category);
            }
        }
    }
}
