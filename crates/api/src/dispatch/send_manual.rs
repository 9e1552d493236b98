use super::guard::DispatchGuard;
use crate::error::NotifierError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use stay_notifier_api_structs::send_manual::{APIResponse, RequestBody};
use stay_notifier_domain::{
    render, render_text, DispatchKey, DispatchOutcome, DispatchPolicy, MessageTemplate,
    PropertyTarget, RenderError, RenderedMessage, Stay, TickContext, TriggerType, ID,
};
use stay_notifier_infra::{NotifierContext, SendOutcome};
use tracing::{error, info};

/// Manual kind and trigger type of the notice sent to guests of any phase
const COMMON_KIND: &str = "common";
/// Sent for the `common` kind while no `common` template is stored
const DEFAULT_COMMON_NOTICE: &str = "[공지사항] {name}님, {accommodation}에서 안내 말씀 드립니다.";

pub async fn send_manual_controller(
    body: web::Json<RequestBody>,
    ctx: web::Data<NotifierContext>,
) -> Result<HttpResponse, NotifierError> {
    let body = body.0;
    let usecase = SendManualUseCase {
        stay_id: body.stay_id,
        kind: body.kind,
        template_id: body.template_id,
        custom_body: body.custom_body,
    };

    execute(usecase, &ctx)
        .await
        .map(|res| HttpResponse::Ok().json(res))
        .map_err(NotifierError::from)
}

/// Sends one message to a stay on operator request. The send is not
/// guarded against earlier dispatches, but it is logged.
#[derive(Debug)]
pub struct SendManualUseCase {
    pub stay_id: ID,
    pub kind: String,
    pub template_id: Option<ID>,
    /// Takes precedence over `template_id`
    pub custom_body: Option<String>,
}

/// Picks the stored `common` template for the stay's property, preferring
/// one targeting the property itself over one for all properties.
fn find_common_template(templates: Vec<MessageTemplate>, stay: &Stay) -> Option<MessageTemplate> {
    templates
        .into_iter()
        .filter(|t| {
            t.trigger_type.as_str() == COMMON_KIND && t.property.includes(&stay.property_name)
        })
        .min_by_key(|t| t.property == PropertyTarget::AllProperties)
}

#[derive(Debug)]
pub enum UseCaseError {
    StayNotFound(ID),
    TemplateNotFound(ID),
    NoContent,
    Render(RenderError),
    SendFailed(String),
    StoreUnavailable(anyhow::Error),
}

impl From<UseCaseError> for NotifierError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StayNotFound(id) => {
                Self::NotFound(format!("The stay with id: {}, was not found.", id))
            }
            UseCaseError::TemplateNotFound(id) => {
                Self::NotFound(format!("The template with id: {}, was not found.", id))
            }
            UseCaseError::NoContent => Self::BadClientData(
                "Either a templateId or a customBody is required to send a message".into(),
            ),
            UseCaseError::Render(e) => Self::BadClientData(e.to_string()),
            UseCaseError::SendFailed(_) | UseCaseError::StoreUnavailable(_) => {
                Self::InternalError
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendManualUseCase {
    type Response = APIResponse;

    type Error = UseCaseError;

    const NAME: &'static str = "SendManual";

    async fn execute(&mut self, ctx: &NotifierContext) -> Result<Self::Response, Self::Error> {
        let stay = ctx
            .repos
            .stays
            .find(&self.stay_id)
            .await
            .ok_or_else(|| UseCaseError::StayNotFound(self.stay_id.clone()))?;

        let custom_body = self
            .custom_body
            .as_ref()
            .filter(|body| !body.trim().is_empty());
        let message = match (custom_body, &self.template_id) {
            (Some(body), _) => RenderedMessage {
                subject: None,
                body: render_text(body, &stay).map_err(UseCaseError::Render)?,
            },
            (None, Some(template_id)) => {
                let template = ctx
                    .repos
                    .templates
                    .find(template_id)
                    .await
                    .ok_or_else(|| UseCaseError::TemplateNotFound(template_id.clone()))?;
                render(&template, &stay).map_err(UseCaseError::Render)?
            }
            (None, None) if self.kind == COMMON_KIND => {
                let templates = ctx
                    .repos
                    .templates
                    .list_all()
                    .await
                    .map_err(UseCaseError::StoreUnavailable)?;
                match find_common_template(templates, &stay) {
                    Some(template) => render(&template, &stay).map_err(UseCaseError::Render)?,
                    None => {
                        info!("No common template is stored, sending the default notice");
                        RenderedMessage {
                            subject: None,
                            body: render_text(DEFAULT_COMMON_NOTICE, &stay)
                                .map_err(UseCaseError::Render)?,
                        }
                    }
                }
            }
            (None, None) => return Err(UseCaseError::NoContent),
        };

        let tick = TickContext::capture(ctx.sys.now(), &ctx.config.timezone, &Default::default());
        let key = DispatchKey {
            stay_id: stay.id.clone(),
            trigger_type: TriggerType::manual(&self.kind),
            day: tick.today(),
        };

        let send_outcome = ctx
            .sms
            .send(&stay.contact, &message.body, message.subject.as_deref())
            .await;
        let outcome = if send_outcome.is_delivered() {
            DispatchOutcome::Success
        } else {
            DispatchOutcome::Failure
        };

        // Manual sends may repeat, the latest attempt of the day is kept
        let guard = DispatchGuard::new(
            ctx.repos.dispatch_logs.as_ref(),
            DispatchPolicy {
                suppress_duplicates: false,
            },
        );
        if let Err(e) = guard.record(&key, tick.now(), outcome).await {
            error!("Unable to log manual send: {:?}. Error: {:?}", key, e);
        }

        match send_outcome {
            SendOutcome::Delivered { message_id } => Ok(APIResponse {
                trigger_type: key.trigger_type.to_string(),
                outcome,
                message_id: Some(message_id),
            }),
            SendOutcome::Failed { reason } => Err(UseCaseError::SendFailed(reason)),
        }
    }
}
