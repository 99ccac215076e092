//! Fixed prompt text for note generation

use crate::request::GenerationRequest;

/// Behavioral rules sent as the system turn of every request
pub const SYSTEM_INSTRUCTION: &str
  = "你是一名小红书爆款文案创作专家，精通各种风格和品类的内容创作。请按照以下要求生成文案：
1. 生成5个吸引人的标题，每个标题包含emoji，不超过20字
2. 撰写正文，分段清晰，每段不超过2行，使用口语化表达
3. 正文中适当添加emoji增强情感
4. 在结尾添加5个相关话题标签，格式如：#话题标签
5. 直接输出文案内容，不要有任何解释或说明
";

pub fn system_instruction() -> &'static str
{   SYSTEM_INSTRUCTION
}

/// Per-request user turn; each parameter is substituted once, in one pass
pub fn user_instruction(request: &GenerationRequest) -> String
{   format!(
"请创作一篇关于【{theme}】的小红书文案。

具体要求：
1. 文案风格：{style}
2. 文案长度：{length}
3. 内容品类：{category}
4. 使用小红书流行语：如\"谁懂啊\"、\"绝绝子\"、\"亲测有效\"等
5. 语气亲切自然，像在和朋友分享
"
    , theme = request.theme
    , style = request.style.label()
    , length = request.length.label()
    , category = request.category.label()
    )
}

/// Output-size budget for the request's length
pub fn max_tokens(request: &GenerationRequest) -> u32
{   request.length.max_tokens()
}
