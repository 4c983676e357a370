pub mod alert_service;
pub mod budget_service;
pub mod category_service;
pub mod goal_service;
pub mod insight_service;
pub mod recurrence_service;
pub mod report_service;
pub mod sharing_service;
pub mod summary_service;
pub mod template_service;
pub mod transaction_service;

pub use alert_service::AlertService;
pub use budget_service::BudgetService;
pub use category_service::CategoryService;
pub use goal_service::GoalService;
pub use insight_service::InsightService;
pub use recurrence_service::RecurrenceService;
pub use report_service::ReportService;
pub use sharing_service::SharingService;
pub use summary_service::SummaryService;
pub use template_service::TemplateService;
pub use transaction_service::TransactionService;
