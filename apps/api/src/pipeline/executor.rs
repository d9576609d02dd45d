//! The staged pipeline state machine.
//!
//! Four work stages run in sequence within one task. After each stage the
//! transition function inspects the context's error list: any recorded
//! failure routes to the error terminal, otherwise the machine advances.
//! Stages catch every failure of their own work; only the driver decides
//! routing. Each stage writes its progress checkpoint into the shared job
//! store on entry, before doing any work, so concurrent readers observe
//! monotonically increasing progress even through slow stages.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::analysis::skill_matcher::{analyze_skill_match, prioritized_gaps};
use crate::analysis::{ProfileParser, RecommendationEngine, RequirementExtractor};
use crate::errors::AnalysisError;
use crate::jobs::JobStore;
use crate::pipeline::context::{AnalysisInput, PipelineContext};

/// Pipeline states. `Done` and `ErrorTerminal` are terminal; the error
/// terminal performs no further work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ParseProfile,
    ExtractRequirements,
    AnalyzeGaps,
    GenerateRecommendations,
    Done,
    ErrorTerminal,
}

impl Stage {
    fn successor(self) -> Stage {
        match self {
            Stage::ParseProfile => Stage::ExtractRequirements,
            Stage::ExtractRequirements => Stage::AnalyzeGaps,
            Stage::AnalyzeGaps => Stage::GenerateRecommendations,
            Stage::GenerateRecommendations => Stage::Done,
            Stage::Done => Stage::Done,
            Stage::ErrorTerminal => Stage::ErrorTerminal,
        }
    }

    /// Progress checkpoint written on stage entry, before the stage works.
    fn entry_checkpoint(self) -> Option<(u8, &'static str)> {
        match self {
            Stage::ParseProfile => Some((10, "Parsing CV...")),
            Stage::ExtractRequirements => Some((30, "Analyzing job description...")),
            Stage::AnalyzeGaps => Some((50, "Identifying skill gaps...")),
            Stage::GenerateRecommendations => Some((65, "Generating project recommendations...")),
            Stage::Done | Stage::ErrorTerminal => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::ErrorTerminal)
    }
}

/// Transition function: a recorded stage failure short-circuits to the
/// error terminal, otherwise the machine advances to the successor.
pub fn advance(stage: Stage, ctx: &PipelineContext) -> Stage {
    if !ctx.errors.is_empty() {
        Stage::ErrorTerminal
    } else {
        stage.successor()
    }
}

/// Drives the four analysis stages for one job and reports progress and
/// the terminal outcome into the job store. All collaborators are
/// injected, so runs are testable without any network.
pub struct PipelineExecutor {
    store: Arc<JobStore>,
    profile_parser: Arc<dyn ProfileParser>,
    requirement_extractor: Arc<dyn RequirementExtractor>,
    recommender: Arc<dyn RecommendationEngine>,
}

impl PipelineExecutor {
    pub fn new(
        store: Arc<JobStore>,
        profile_parser: Arc<dyn ProfileParser>,
        requirement_extractor: Arc<dyn RequirementExtractor>,
        recommender: Arc<dyn RecommendationEngine>,
    ) -> Self {
        Self {
            store,
            profile_parser,
            requirement_extractor,
            recommender,
        }
    }

    /// Runs the whole pipeline to its terminal state. This is one
    /// job-run; it never returns an error, the outcome lands in the
    /// job store as Completed or Failed.
    pub async fn run(&self, job_id: Uuid, input: AnalysisInput) {
        info!("Starting analysis for job {job_id}");
        self.store.set_processing(job_id, "Starting analysis...");

        let mut ctx = PipelineContext::new(input);
        let mut stage = Stage::ParseProfile;

        while !stage.is_terminal() {
            if let Some((percentage, step)) = stage.entry_checkpoint() {
                ctx.set_progress(percentage, step);
                self.store.set_progress(job_id, percentage, step);
            }

            self.run_stage(stage, &mut ctx).await;
            self.store
                .set_progress(job_id, ctx.progress, &ctx.current_step);

            stage = advance(stage, &ctx);
        }

        match stage {
            Stage::ErrorTerminal => {
                self.store.set_failed(job_id, &ctx.joined_errors());
            }
            _ => match ctx.result.take() {
                Some(result) => self.store.set_completed(job_id, result),
                None => {
                    self.store
                        .set_failed(job_id, "No recommendation result generated");
                }
            },
        }
        info!("Job {job_id} run finished");
    }

    async fn run_stage(&self, stage: Stage, ctx: &mut PipelineContext) {
        match stage {
            Stage::ParseProfile => self.parse_profile(ctx).await,
            Stage::ExtractRequirements => self.extract_requirements(ctx).await,
            Stage::AnalyzeGaps => self.analyze_gaps(ctx),
            Stage::GenerateRecommendations => self.generate_recommendations(ctx).await,
            Stage::Done | Stage::ErrorTerminal => {}
        }
    }

    async fn parse_profile(&self, ctx: &mut PipelineContext) {
        match self.profile_parser.parse(&ctx.cv_source).await {
            Ok(cv_data) => {
                ctx.cv_data = Some(cv_data);
                ctx.set_progress(25, "CV parsed");
            }
            Err(err) => ctx.record_error(err),
        }
    }

    async fn extract_requirements(&self, ctx: &mut PipelineContext) {
        match self
            .requirement_extractor
            .extract(&ctx.job_description)
            .await
        {
            Ok(requirements) => {
                ctx.job_requirements = Some(requirements);
                ctx.set_progress(45, "Job description analyzed");
            }
            Err(err) => ctx.record_error(err),
        }
    }

    fn analyze_gaps(&self, ctx: &mut PipelineContext) {
        let (Some(cv_data), Some(job_requirements)) = (&ctx.cv_data, &ctx.job_requirements) else {
            ctx.record_error(AnalysisError::GapAnalysis(
                "missing CV data or job requirements".to_string(),
            ));
            return;
        };

        let analysis = analyze_skill_match(cv_data, job_requirements);
        ctx.skill_gaps = prioritized_gaps(&analysis, job_requirements);
        ctx.match_analysis = Some(analysis);
        ctx.set_progress(60, "Skill gaps identified");
    }

    async fn generate_recommendations(&self, ctx: &mut PipelineContext) {
        let (Some(job_requirements), Some(analysis)) = (&ctx.job_requirements, &ctx.match_analysis)
        else {
            ctx.record_error(AnalysisError::Recommendation(
                "missing gap analysis".to_string(),
            ));
            return;
        };

        match self
            .recommender
            .generate(job_requirements, analysis, &ctx.skill_gaps)
            .await
        {
            Ok(result) => {
                ctx.result = Some(result);
                ctx.set_progress(100, "Complete!");
            }
            Err(err) => ctx.record_error(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::analysis::CvSource;
    use crate::jobs::JobStatus;
    use crate::models::cv::{CvData, Skill};
    use crate::models::job::{JobRequirements, SkillPriority, SkillRequirement};
    use crate::models::recommendation::{
        RecommendationResult, SkillGap, SkillMatchAnalysis,
    };

    struct StubParser {
        fail: bool,
    }

    #[async_trait]
    impl ProfileParser for StubParser {
        async fn parse(&self, _source: &CvSource) -> Result<CvData, AnalysisError> {
            if self.fail {
                return Err(AnalysisError::CvParsing("stub parse failure".to_string()));
            }
            Ok(CvData {
                skills: vec![Skill {
                    name: "Python".to_string(),
                    category: None,
                    proficiency: None,
                    years_of_experience: None,
                }],
                ..Default::default()
            })
        }
    }

    struct StubExtractor {
        fail: bool,
    }

    #[async_trait]
    impl RequirementExtractor for StubExtractor {
        async fn extract(&self, _job_description: &str) -> Result<JobRequirements, AnalysisError> {
            if self.fail {
                return Err(AnalysisError::RequirementAnalysis(
                    "stub extract failure".to_string(),
                ));
            }
            Ok(JobRequirements {
                job_title: "Engineer".to_string(),
                required_skills: vec![
                    SkillRequirement {
                        name: "Python".to_string(),
                        priority: SkillPriority::Required,
                        category: None,
                        years_required: None,
                        description: None,
                    },
                    SkillRequirement {
                        name: "Kubernetes".to_string(),
                        priority: SkillPriority::Required,
                        category: None,
                        years_required: None,
                        description: None,
                    },
                ],
                ..Default::default()
            })
        }
    }

    struct StubRecommender {
        called: AtomicBool,
    }

    impl StubRecommender {
        fn new() -> Self {
            Self {
                called: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl RecommendationEngine for StubRecommender {
        async fn generate(
            &self,
            _job: &JobRequirements,
            analysis: &SkillMatchAnalysis,
            _gaps: &[SkillGap],
        ) -> Result<RecommendationResult, AnalysisError> {
            self.called.store(true, Ordering::SeqCst);
            Ok(RecommendationResult {
                skill_match_analysis: analysis.clone(),
                skill_gap_recommendations: vec![],
                overall_assessment: "stub assessment".to_string(),
                estimated_preparation_time: None,
            })
        }
    }

    fn executor(
        parser_fails: bool,
        extractor_fails: bool,
    ) -> (Arc<JobStore>, Arc<StubRecommender>, PipelineExecutor) {
        let store = Arc::new(JobStore::new(Duration::from_secs(3600)));
        let recommender = Arc::new(StubRecommender::new());
        let executor = PipelineExecutor::new(
            store.clone(),
            Arc::new(StubParser { fail: parser_fails }),
            Arc::new(StubExtractor {
                fail: extractor_fails,
            }),
            recommender.clone(),
        );
        (store, recommender, executor)
    }

    fn input() -> AnalysisInput {
        AnalysisInput {
            cv_source: CvSource::Text("a".repeat(100)),
            job_description: "We need a Python engineer with Kubernetes experience.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_successful_run_completes_with_full_progress() {
        let (store, recommender, executor) = executor(false, false);
        let job_id = store.create();

        executor.run(job_id, input()).await;

        let job = store.get(job_id).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress, 100);
        let result = job.result.unwrap();
        assert_eq!(result.overall_assessment, "stub assessment");
        // Python matched, Kubernetes missing.
        assert_eq!(
            result.skill_match_analysis.missing_required_skills,
            vec!["kubernetes"]
        );
        assert!(recommender.called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_failure_at_stage_two_skips_later_stages() {
        let (store, recommender, executor) = executor(false, true);
        let job_id = store.create();

        executor.run(job_id, input()).await;

        let job = store.get(job_id).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        let error = job.error.unwrap();
        assert!(!error.is_empty());
        assert!(error.contains("stub extract failure"));
        // Stages 3 and 4 never ran.
        assert!(!recommender.called.load(Ordering::SeqCst));
        assert!(job.result.is_none());
    }

    #[tokio::test]
    async fn test_failure_at_stage_one_fails_with_parsing_error() {
        let (store, _, executor) = executor(true, false);
        let job_id = store.create();

        executor.run(job_id, input()).await;

        let job = store.get(job_id).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.error.unwrap().contains("Failed to parse CV"));
    }

    #[test]
    fn test_advance_routes_to_error_terminal_on_any_error() {
        let mut ctx = PipelineContext::new(input());
        assert_eq!(advance(Stage::ParseProfile, &ctx), Stage::ExtractRequirements);

        ctx.record_error(AnalysisError::CvParsing("x".to_string()));
        assert_eq!(advance(Stage::ParseProfile, &ctx), Stage::ErrorTerminal);
        assert_eq!(advance(Stage::AnalyzeGaps, &ctx), Stage::ErrorTerminal);
    }

    #[test]
    fn test_stage_checkpoints_are_monotonic() {
        let stages = [
            Stage::ParseProfile,
            Stage::ExtractRequirements,
            Stage::AnalyzeGaps,
            Stage::GenerateRecommendations,
        ];
        let checkpoints: Vec<u8> = stages
            .iter()
            .filter_map(|s| s.entry_checkpoint())
            .map(|(p, _)| p)
            .collect();
        assert!(checkpoints.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_terminal_stages_have_no_checkpoint_and_self_loop() {
        assert!(Stage::Done.entry_checkpoint().is_none());
        assert!(Stage::ErrorTerminal.entry_checkpoint().is_none());
        assert_eq!(Stage::Done.successor(), Stage::Done);
        assert_eq!(Stage::ErrorTerminal.successor(), Stage::ErrorTerminal);
    }
}
