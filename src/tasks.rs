mod action_invoker;
mod api_ext;
mod config_store;
mod notifier;
mod results_store;
mod task_action;
mod task_config;
mod task_execution_result;
mod task_kind;
mod task_schedule;
mod tasks_configuration;

pub use self::{
    action_invoker::{ActionInvoker, ActionResponse, HttpActionInvoker},
    api_ext::{TaskCreateParams, TasksApiExt, TasksListParams},
    config_store::{TasksConfigStore, TasksListFilter},
    notifier::{Notifier, WebhookNotifier},
    results_store::ResultsStore,
    task_action::TaskAction,
    task_config::TaskConfig,
    task_execution_result::TaskExecutionResult,
    task_kind::TaskKind,
    task_schedule::TaskSchedule,
    tasks_configuration::TasksConfiguration,
};
