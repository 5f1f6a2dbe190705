use cucumber::World;
use ghmm::error::MilestoneError;
use ghmm::github::fake::FakeGitHub;
use ghmm::plan::PlanReport;

#[derive(Debug, Default, World)]
pub struct GhmmWorld {
    pub github: FakeGitHub,
    pub captured_output: Vec<u8>,
    pub captured_error: Vec<u8>,
    pub result: Option<Result<PlanReport, MilestoneError>>,
}

#[tokio::main]
async fn main() {
    GhmmWorld::run("features").await;
}

mod steps;
