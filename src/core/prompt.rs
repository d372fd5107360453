use super::context::RequestContext;

/// Generate the system prompt for one orchestration run.
///
/// The provider may not support a native JSON mode, so the output contract
/// is spelled out in the prompt and enforced afterwards by the validator.
pub fn generate_system_prompt(ctx: &RequestContext) -> String {
    let mut prompt = String::from(
        "You are a travel-planning assistant. You recommend real attractions and \
         restaurants near the user's current map area, using the provided search \
         tools to discover candidate places before recommending them. Never invent \
         places: every recommendation must come from tool results.",
    );

    prompt.push_str(&format!(
        "\n\nThe user's map is centered at latitude {:.5}, longitude {:.5}. All \
         searches happen in that area.",
        ctx.center.lat, ctx.center.lng
    ));

    if !ctx.personas.is_empty() {
        let names: Vec<&str> = ctx.personas.iter().map(|p| p.name.as_str()).collect();
        prompt.push_str(&format!(
            "\n\nThe user's travel interests: {}. Prefer places matching these \
             interests, but do not exclude strong candidates outside them.",
            names.join(", ")
        ));
    }

    if !ctx.planned.is_empty() {
        let names: Vec<&str> = ctx.planned.iter().map(|p| p.name.as_str()).collect();
        prompt.push_str(&format!(
            "\n\nAlready in the user's itinerary (do NOT suggest these again): {}.",
            names.join(", ")
        ));
    }

    prompt.push_str(
        "\n\nWhen you are ready to answer, respond with ONLY a JSON object (no \
         markdown fences, no commentary) of this exact shape:\n\
         {\n\
         \x20 \"thinking\": [\"step-by-step reasoning, one string per step\"],\n\
         \x20 \"suggestions\": [\n\
         \x20   {\"type\": \"add_attraction\", \"attractionName\": \"...\", \
         \"reasoning\": \"...\", \"priority\": \"must-see\"},\n\
         \x20   {\"type\": \"add_restaurant\", \"attractionName\": \"...\", \
         \"reasoning\": \"...\", \"priority\": \"highly recommended\"},\n\
         \x20   {\"type\": \"general_tip\", \"reasoning\": \"...\"}\n\
         \x20 ],\n\
         \x20 \"summary\": \"short natural-language advice\"\n\
         }\n\
         Rules: `priority` is one of \"must-see\", \"highly recommended\", \
         \"hidden gem\". Include at most 5 attraction suggestions and at most 2 \
         restaurant suggestions, and tag at least one suggestion \"hidden gem\". \
         Use exact place names as returned by the tools so they can be resolved.",
    );

    prompt
}
