use certify_core::entities::WebApplicationResponse;

use crate::error::DatabaseError;
use crate::helpers::get_opt_string;
use crate::service::CertifyService;

impl CertifyService {
    /// Answers on an application in form order, or `None` when there are none.
    pub async fn application_responses(
        &self,
        application_id: i64,
    ) -> Result<Option<Vec<WebApplicationResponse>>, DatabaseError> {
        let responses = self
            .db()
            .query_map(
                "SELECT id, web_application_id, app_form_question_id, question, response,
                 section, section_sub_title
                 FROM vw_application_responses
                 WHERE web_application_id = ?1
                 ORDER BY sort_order, id",
                vec![application_id.into()],
                |row| {
                    Ok(WebApplicationResponse {
                        id: row.get::<i64>(0)?,
                        web_application_id: row.get::<i64>(1)?,
                        app_form_question_id: row.get::<i64>(2)?,
                        question: get_opt_string(row, 3)?,
                        response: get_opt_string(row, 4)?,
                        section: get_opt_string(row, 5)?,
                        section_sub_title: get_opt_string(row, 6)?,
                    })
                },
            )
            .await?;
        Ok((!responses.is_empty()).then_some(responses))
    }
}
