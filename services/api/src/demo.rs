use crate::infra::{in_memory_service, load_engine};
use clap::Args;
use prakriti::config::AppConfig;
use prakriti::error::AppError;
use prakriti::workflows::prakriti::{
    aggregate_scores, classify, normalize_answers, Answer, Classification, ClassifierConfig,
    Dosha, MealCompletion, MealSlot, Plan, PlanOptions, PlanPreview, QuestionCatalog,
    ResponseSetImporter, UserId, ValidationError,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Questionnaire export with respondent, question, and option columns
    #[arg(long)]
    pub(crate) csv: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct PlanArgs {
    /// Dominant constitution (vata, pitta, or kapha)
    #[arg(long, value_parser = crate::infra::parse_dosha)]
    pub(crate) dosha: Dosha,
    /// Optional secondary constitution for blended guidance
    #[arg(long, value_parser = crate::infra::parse_dosha)]
    pub(crate) secondary: Option<Dosha>,
    /// Plan length in weeks (defaults to the configured length)
    #[arg(long)]
    pub(crate) weeks: Option<u32>,
    /// Seed for dish selection (defaults to the configured sample seed)
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Free-text dietary restrictions, e.g. "no dairy, no nuts"
    #[arg(long)]
    pub(crate) restrictions: Option<String>,
    /// Wellness goals to attach guidance for
    #[arg(long = "goal")]
    pub(crate) goals: Vec<String>,
    /// Print every day of the plan instead of the first week
    #[arg(long)]
    pub(crate) all_days: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Respondent identifier used for the demo run
    #[arg(long, default_value = "demo-user")]
    pub(crate) user: String,
    /// Number of meals to mark complete after the plan is generated
    #[arg(long, default_value_t = 5)]
    pub(crate) meals: u32,
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let engine = load_engine(&AppConfig::load()?.assessment)?;
    let sets = ResponseSetImporter::from_path(&args.csv)?;

    println!(
        "Constitution report for {} ({} respondents)",
        args.csv.display(),
        sets.len()
    );
    for set in &sets {
        match assess_answers(&set.answers, &engine.catalog, &engine.config.classifier) {
            Ok(classification) => render_classification(&set.respondent, &classification),
            Err(err) => println!("- {}: rejected ({})", set.respondent, err),
        }
    }

    Ok(())
}

pub(crate) fn run_plan(args: PlanArgs) -> Result<(), AppError> {
    let all_days = args.all_days;
    let plan = plan_for_args(args)?;
    render_plan(&plan, all_days);
    Ok(())
}

/// Build the requested plan with the configured engine; omitted weeks and
/// seed fall back to the configured defaults.
fn plan_for_args(args: PlanArgs) -> Result<Plan, AppError> {
    let PlanArgs {
        dosha,
        secondary,
        weeks,
        seed,
        restrictions,
        goals,
        ..
    } = args;

    let engine = load_engine(&AppConfig::load()?.assessment)?;
    let service = in_memory_service(engine);
    let plan = service.preview_plan(PlanPreview {
        dosha,
        secondary,
        goals,
        restrictions: restrictions.unwrap_or_default(),
        duration_weeks: weeks,
        seed,
    })?;
    Ok(plan)
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { user, meals } = args;
    let user = UserId(user);

    let engine = load_engine(&AppConfig::load()?.assessment)?;
    let service = in_memory_service(engine);

    println!("Prakriti assessment demo");
    let answers = demo_answers(service.questionnaire());
    let record = match service.assess(&user, &answers) {
        Ok(record) => record,
        Err(err) => {
            println!("  Assessment rejected: {}", err);
            return Ok(());
        }
    };
    render_classification(&user.0, &record.classification);
    println!("  Dietary principles:");
    for principle in &record.recommendations.dietary_principles {
        println!("    - {}", principle);
    }
    println!("  Favour: {}", record.recommendations.foods_to_include.join(", "));
    println!("  Reduce: {}", record.recommendations.foods_to_avoid.join(", "));

    let options = PlanOptions {
        goals: vec!["Stress Relief".to_string()],
        restrictions: "no dairy".to_string(),
        duration_weeks: Some(2),
        seed: None,
    };
    let plan = match service.generate_plan(&user, options) {
        Ok(record) => record.plan,
        Err(err) => {
            println!("  Plan unavailable: {}", err);
            return Ok(());
        }
    };
    println!();
    render_plan(&plan, false);

    let mut summary = None;
    for completion in demo_completions(&plan, meals) {
        match service.record_meal(&user, completion) {
            Ok(progress) => summary = Some(progress),
            Err(err) => {
                println!("  Meal log rejected: {}", err);
                return Ok(());
            }
        }
    }
    let summary = match summary {
        Some(summary) => summary,
        None => match service.progress(&user) {
            Ok(summary) => summary,
            Err(err) => {
                println!("  Progress unavailable: {}", err);
                return Ok(());
            }
        },
    };

    println!(
        "\nProgress: {}/{} meals ({}%) | week {} ({}/{} this week)",
        summary.completed,
        summary.total_meal_slots,
        summary.percent_complete,
        summary.current_week,
        summary.completed_this_week,
        summary.weekly_meal_slots
    );
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("  Progress payload:\n{}", json),
        Err(err) => println!("  Progress payload unavailable: {}", err),
    }

    Ok(())
}

fn assess_answers(
    answers: &[Answer],
    catalog: &QuestionCatalog,
    config: &ClassifierConfig,
) -> Result<Classification, ValidationError> {
    let pairs = normalize_answers(answers, catalog)?;
    Ok(classify(&aggregate_scores(&pairs), config))
}

/// Pick the first option on every question, which leans the demo toward Vata.
fn demo_answers(catalog: &QuestionCatalog) -> Vec<Answer> {
    catalog
        .questions()
        .iter()
        .filter_map(|question| {
            question.options.first().map(|option| Answer {
                question_id: question.id,
                option_id: option.id,
            })
        })
        .collect()
}

fn demo_completions(plan: &Plan, meals: u32) -> Vec<MealCompletion> {
    let slots = MealSlot::ordered();
    (0..meals)
        .map(|index| MealCompletion {
            day_index: index / slots.len() as u32,
            slot: slots[index as usize % slots.len()],
        })
        .filter(|completion| completion.day_index < plan.total_days())
        .collect()
}

fn render_classification(respondent: &str, classification: &Classification) {
    let tie = if classification.tie { " (tie)" } else { "" };
    println!(
        "- {}: {}{} | {}",
        respondent,
        classification.constitution_label(),
        tie,
        classification.dominant.elements()
    );
    for entry in &classification.scores.entries {
        println!(
            "    {:<6} {:>3} pts {:>3}%",
            entry.dosha.label(),
            entry.total,
            entry.percentage
        );
    }
}

fn render_plan(plan: &Plan, all_days: bool) {
    println!(
        "{} meal plan: {} weeks, seed {}",
        plan.constitution, plan.duration_weeks, plan.seed
    );
    if plan.restriction_unsatisfiable {
        let slots: Vec<&str> = plan
            .unsatisfiable_slots
            .iter()
            .map(|slot| slot.label())
            .collect();
        println!(
            "  Restrictions \"{}\" could not be met for: {}",
            plan.restrictions,
            slots.join(", ")
        );
    }

    let days = if all_days { &plan.days[..] } else { plan.week(1) };
    for day in days {
        let meals: Vec<String> = day
            .meals
            .iter()
            .map(|meal| format!("{}: {}", meal.slot.label(), meal.dish))
            .collect();
        println!(
            "  Week {} {:<9} {}",
            day.week,
            day.weekday,
            meals.join(" | ")
        );
    }
    if !all_days && plan.days.len() > days.len() {
        println!("  ... {} more days", plan.days.len() - days.len());
    }

    if !plan.supplements.is_empty() {
        println!("  Supplements: {}", plan.supplements.join(", "));
    }
    for (goal, guidance) in &plan.goal_guidance {
        println!("  Goal {}: {}", goal, guidance.join("; "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prakriti::workflows::prakriti::{
        build_plan, KnowledgeBase, PlanRequest, PlanSeed, DEFAULT_PLAN_WEEKS,
    };
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn plan_args(dosha: Dosha) -> PlanArgs {
        PlanArgs {
            dosha,
            secondary: None,
            weeks: None,
            seed: None,
            restrictions: None,
            goals: Vec::new(),
            all_days: false,
        }
    }

    #[test]
    fn demo_answers_cover_the_standard_catalog() {
        let catalog = QuestionCatalog::standard();
        let answers = demo_answers(&catalog);
        assert_eq!(answers.len(), catalog.len());

        let classification = assess_answers(&answers, &catalog, &ClassifierConfig::default())
            .expect("complete set classifies");
        assert_eq!(classification.scores.percentage_sum(), 100);
    }

    #[test]
    fn demo_completions_walk_slots_in_order() {
        let request = PlanRequest {
            duration_weeks: 1,
            ..PlanRequest::new(Classification::assumed(Dosha::Kapha, None))
        };
        let plan =
            build_plan(&request, &KnowledgeBase::standard(), PlanSeed(3)).expect("plan builds");

        let completions = demo_completions(&plan, 5);
        assert_eq!(completions.len(), 5);
        assert_eq!(completions[0].key(), "breakfast-0");
        assert_eq!(completions[3].key(), "breakfast-1");
        assert_eq!(completions[4].slot, MealSlot::Lunch);

        assert_eq!(demo_completions(&plan, 100).len(), 21);
    }

    #[test]
    fn plan_command_uses_configured_defaults() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        std::env::set_var("PRAKRITI_DEFAULT_PLAN_WEEKS", "2");
        std::env::set_var("PRAKRITI_SAMPLE_PLAN_SEED", "7");

        let configured = plan_for_args(plan_args(Dosha::Pitta));
        let explicit = plan_for_args(PlanArgs {
            weeks: Some(1),
            seed: Some(42),
            ..plan_args(Dosha::Pitta)
        });

        std::env::remove_var("PRAKRITI_DEFAULT_PLAN_WEEKS");
        std::env::remove_var("PRAKRITI_SAMPLE_PLAN_SEED");

        let configured = configured.expect("plan builds");
        assert_eq!(configured.duration_weeks, 2);
        assert_eq!(configured.seed, PlanSeed(7));

        let explicit = explicit.expect("plan builds");
        assert_eq!(explicit.duration_weeks, 1);
        assert_eq!(explicit.seed, PlanSeed(42));

        let unconfigured = plan_for_args(plan_args(Dosha::Pitta)).expect("plan builds");
        assert_eq!(unconfigured.duration_weeks, DEFAULT_PLAN_WEEKS);
    }

    #[test]
    fn invalid_configuration_fails_the_plan_command() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        std::env::set_var("PRAKRITI_DEFAULT_PLAN_WEEKS", "0");
        let result = plan_for_args(plan_args(Dosha::Vata));
        std::env::remove_var("PRAKRITI_DEFAULT_PLAN_WEEKS");

        match result {
            Err(AppError::Config(_)) => {}
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn run_plan_prints_without_error() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        let args = PlanArgs {
            dosha: Dosha::Vata,
            secondary: Some(Dosha::Pitta),
            weeks: Some(1),
            seed: Some(42),
            restrictions: Some("no dairy".to_string()),
            goals: vec!["energy".to_string()],
            all_days: true,
        };
        run_plan(args).expect("plan renders");
    }

    #[test]
    fn run_demo_completes_with_in_memory_stores() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        run_demo(DemoArgs {
            user: "demo-user".to_string(),
            meals: 4,
        })
        .expect("demo runs");
    }
}
