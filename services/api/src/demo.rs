use std::sync::Arc;

use crate::infra::{seed_requests, InMemoryPatientDirectory, InMemoryRequestDirectory};
use acolhe::error::AppError;
use acolhe::workflows::patients::PatientRoster;
use acolhe::workflows::requests::{
    NoticeOutcome, PsychologistId, QueueSummary, RequestReviewService, ReviewNotice,
    ReviewNotifier,
};
use clap::Args;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Psychologist acting as the reviewer
    #[arg(long, default_value = "psi-1")]
    pub(crate) psychologist: String,
    /// Leave the queue untouched instead of accepting/rejecting the seeds
    #[arg(long)]
    pub(crate) list_only: bool,
}

/// Notifier that prints the toasts a reviewer would see in the client.
struct ConsoleNotifier;

impl ReviewNotifier for ConsoleNotifier {
    fn notify(&self, notice: ReviewNotice) {
        let marker = match notice.outcome {
            NoticeOutcome::Success => "ok",
            NoticeOutcome::Failure => "!!",
        };
        println!("  [{marker}] {}", notice.message);
    }
}

/// Walk the request review workflow against the in-memory substitute: load
/// the pending queue, accept the first request, reject the second, then show
/// the reviewer's roster.
pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let reviewer = PsychologistId(args.psychologist.clone());

    let directory = Arc::new(InMemoryRequestDirectory::seeded(seed_requests()));
    let patients = Arc::new(InMemoryPatientDirectory::default());
    let review = RequestReviewService::new(directory, patients.clone(), Arc::new(ConsoleNotifier));

    println!("== Solicitações pendentes ==");
    let pending = match review.load().await {
        Ok(pending) => pending,
        Err(error) => {
            println!("  could not load the queue: {error}");
            return Ok(());
        }
    };

    for request in &pending {
        println!(
            "  {} | {} | urgência {} | {}",
            request.id,
            request.patient.name,
            request.urgency.label(),
            request.description
        );
    }

    let summary = QueueSummary::from_requests(&pending);
    println!(
        "  total {} (alta {}, média {}, baixa {})",
        summary.pending, summary.high_urgency, summary.medium_urgency, summary.low_urgency
    );

    if args.list_only || pending.is_empty() {
        return Ok(());
    }

    println!("\n== Revisão ==");
    let mut queue = pending.iter();
    if let Some(first) = queue.next() {
        println!("  aceitando {} ({})", first.id, first.patient.name);
        if let Err(error) = review.accept(&first.id, &reviewer).await {
            println!("  accept failed: {error}");
        }
    }
    if let Some(second) = queue.next() {
        println!("  recusando {} ({})", second.id, second.patient.name);
        if let Err(error) = review.reject(&second.id).await {
            println!("  reject failed: {error}");
        }
    }

    println!("\n== Pacientes de {} ==", reviewer.0);
    let roster = PatientRoster::new(patients);
    for patient in roster
        .for_psychologist(&reviewer)
        .await
        .unwrap_or_default()
    {
        println!("  {} | {} | {}", patient.name, patient.email, patient.phone);
    }

    println!("\n{} solicitações seguem pendentes", review.pending().len());
    Ok(())
}
