pub mod prompts;
pub mod render;

pub use prompts::{
    prompt_formulation_name, prompt_ingredient_selection, prompt_target, prompt_total_mass,
    prompt_yes_no,
};
pub use render::{
    display_blend_result, display_formulations, display_ingredient_list, format_currency,
    format_mass, format_percentage,
};
