//! Registry of every discriminator (`"type"` value) the response stream defines.
//!
//! Pure data: the decoder accepts strings outside this table too, they simply
//! classify as [`EventGroup::Unknown`].

// Response lifecycle
pub const RESPONSE_CREATED: &str = "response.created";
pub const RESPONSE_IN_PROGRESS: &str = "response.in_progress";
pub const RESPONSE_COMPLETED: &str = "response.completed";
pub const RESPONSE_FAILED: &str = "response.failed";
pub const RESPONSE_INCOMPLETE: &str = "response.incomplete";
pub const RESPONSE_QUEUED: &str = "response.queued";

// Output items
pub const OUTPUT_ITEM_ADDED: &str = "response.output_item.added";
pub const OUTPUT_ITEM_DONE: &str = "response.output_item.done";

// Content parts
pub const CONTENT_PART_ADDED: &str = "response.content_part.added";
pub const CONTENT_PART_DONE: &str = "response.content_part.done";

// Text output
pub const OUTPUT_TEXT_DELTA: &str = "response.output_text.delta";
pub const OUTPUT_TEXT_DONE: &str = "response.output_text.done";
pub const OUTPUT_TEXT_ANNOTATION_ADDED: &str = "response.output_text.annotation.added";

// Refusal
pub const REFUSAL_DELTA: &str = "response.refusal.delta";
pub const REFUSAL_DONE: &str = "response.refusal.done";

// Function call arguments
pub const FUNCTION_CALL_ARGUMENTS_DELTA: &str = "response.function_call_arguments.delta";
pub const FUNCTION_CALL_ARGUMENTS_DONE: &str = "response.function_call_arguments.done";

// File search tool calls
pub const FILE_SEARCH_CALL_IN_PROGRESS: &str = "response.file_search_call.in_progress";
pub const FILE_SEARCH_CALL_SEARCHING: &str = "response.file_search_call.searching";
pub const FILE_SEARCH_CALL_COMPLETED: &str = "response.file_search_call.completed";

// Web search tool calls
pub const WEB_SEARCH_CALL_IN_PROGRESS: &str = "response.web_search_call.in_progress";
pub const WEB_SEARCH_CALL_SEARCHING: &str = "response.web_search_call.searching";
pub const WEB_SEARCH_CALL_COMPLETED: &str = "response.web_search_call.completed";

// Reasoning summary
pub const REASONING_SUMMARY_PART_ADDED: &str = "response.reasoning_summary_part.added";
pub const REASONING_SUMMARY_PART_DONE: &str = "response.reasoning_summary_part.done";
pub const REASONING_SUMMARY_TEXT_DELTA: &str = "response.reasoning_summary_text.delta";
pub const REASONING_SUMMARY_TEXT_DONE: &str = "response.reasoning_summary_text.done";

// Reasoning text
pub const REASONING_TEXT_DELTA: &str = "response.reasoning_text.delta";
pub const REASONING_TEXT_DONE: &str = "response.reasoning_text.done";

// Image generation tool calls
pub const IMAGE_GENERATION_CALL_COMPLETED: &str = "response.image_generation_call.completed";
pub const IMAGE_GENERATION_CALL_GENERATING: &str = "response.image_generation_call.generating";
pub const IMAGE_GENERATION_CALL_IN_PROGRESS: &str = "response.image_generation_call.in_progress";
pub const IMAGE_GENERATION_CALL_PARTIAL_IMAGE: &str = "response.image_generation_call.partial_image";

// MCP tool calls
pub const MCP_CALL_ARGUMENTS_DELTA: &str = "response.mcp_call_arguments.delta";
pub const MCP_CALL_ARGUMENTS_DONE: &str = "response.mcp_call_arguments.done";
pub const MCP_CALL_COMPLETED: &str = "response.mcp_call.completed";
pub const MCP_CALL_FAILED: &str = "response.mcp_call.failed";
pub const MCP_CALL_IN_PROGRESS: &str = "response.mcp_call.in_progress";

// MCP list tools
pub const MCP_LIST_TOOLS_COMPLETED: &str = "response.mcp_list_tools.completed";
pub const MCP_LIST_TOOLS_FAILED: &str = "response.mcp_list_tools.failed";
pub const MCP_LIST_TOOLS_IN_PROGRESS: &str = "response.mcp_list_tools.in_progress";

// Code interpreter tool calls
pub const CODE_INTERPRETER_CALL_IN_PROGRESS: &str = "response.code_interpreter_call.in_progress";
pub const CODE_INTERPRETER_CALL_INTERPRETING: &str = "response.code_interpreter_call.interpreting";
pub const CODE_INTERPRETER_CALL_COMPLETED: &str = "response.code_interpreter_call.completed";
pub const CODE_INTERPRETER_CALL_CODE_DELTA: &str = "response.code_interpreter_call_code.delta";
pub const CODE_INTERPRETER_CALL_CODE_DONE: &str = "response.code_interpreter_call_code.done";

// Custom tool call input
pub const CUSTOM_TOOL_CALL_INPUT_DELTA: &str = "response.custom_tool_call_input.delta";
pub const CUSTOM_TOOL_CALL_INPUT_DONE: &str = "response.custom_tool_call_input.done";

// Generic error
pub const ERROR: &str = "error";

/// Event types after which no further events arrive for the current response.
pub const TERMINAL: &[&str] = &[RESPONSE_COMPLETED, RESPONSE_FAILED, RESPONSE_INCOMPLETE, ERROR];

/// Subsystem an event type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventGroup {
    Lifecycle,
    OutputItem,
    ContentPart,
    Text,
    Refusal,
    FunctionCallArguments,
    FileSearch,
    WebSearch,
    ReasoningSummary,
    ReasoningText,
    ImageGeneration,
    McpCall,
    McpListTools,
    CodeInterpreter,
    CustomToolInput,
    Error,
    Unknown,
}

/// Every registered discriminator with its group.
pub const ALL: &[(&str, EventGroup)] = &[
    (RESPONSE_CREATED, EventGroup::Lifecycle),
    (RESPONSE_IN_PROGRESS, EventGroup::Lifecycle),
    (RESPONSE_COMPLETED, EventGroup::Lifecycle),
    (RESPONSE_FAILED, EventGroup::Lifecycle),
    (RESPONSE_INCOMPLETE, EventGroup::Lifecycle),
    (RESPONSE_QUEUED, EventGroup::Lifecycle),
    (OUTPUT_ITEM_ADDED, EventGroup::OutputItem),
    (OUTPUT_ITEM_DONE, EventGroup::OutputItem),
    (CONTENT_PART_ADDED, EventGroup::ContentPart),
    (CONTENT_PART_DONE, EventGroup::ContentPart),
    (OUTPUT_TEXT_DELTA, EventGroup::Text),
    (OUTPUT_TEXT_DONE, EventGroup::Text),
    (OUTPUT_TEXT_ANNOTATION_ADDED, EventGroup::Text),
    (REFUSAL_DELTA, EventGroup::Refusal),
    (REFUSAL_DONE, EventGroup::Refusal),
    (FUNCTION_CALL_ARGUMENTS_DELTA, EventGroup::FunctionCallArguments),
    (FUNCTION_CALL_ARGUMENTS_DONE, EventGroup::FunctionCallArguments),
    (FILE_SEARCH_CALL_IN_PROGRESS, EventGroup::FileSearch),
    (FILE_SEARCH_CALL_SEARCHING, EventGroup::FileSearch),
    (FILE_SEARCH_CALL_COMPLETED, EventGroup::FileSearch),
    (WEB_SEARCH_CALL_IN_PROGRESS, EventGroup::WebSearch),
    (WEB_SEARCH_CALL_SEARCHING, EventGroup::WebSearch),
    (WEB_SEARCH_CALL_COMPLETED, EventGroup::WebSearch),
    (REASONING_SUMMARY_PART_ADDED, EventGroup::ReasoningSummary),
    (REASONING_SUMMARY_PART_DONE, EventGroup::ReasoningSummary),
    (REASONING_SUMMARY_TEXT_DELTA, EventGroup::ReasoningSummary),
    (REASONING_SUMMARY_TEXT_DONE, EventGroup::ReasoningSummary),
    (REASONING_TEXT_DELTA, EventGroup::ReasoningText),
    (REASONING_TEXT_DONE, EventGroup::ReasoningText),
    (IMAGE_GENERATION_CALL_COMPLETED, EventGroup::ImageGeneration),
    (IMAGE_GENERATION_CALL_GENERATING, EventGroup::ImageGeneration),
    (IMAGE_GENERATION_CALL_IN_PROGRESS, EventGroup::ImageGeneration),
    (IMAGE_GENERATION_CALL_PARTIAL_IMAGE, EventGroup::ImageGeneration),
    (MCP_CALL_ARGUMENTS_DELTA, EventGroup::McpCall),
    (MCP_CALL_ARGUMENTS_DONE, EventGroup::McpCall),
    (MCP_CALL_COMPLETED, EventGroup::McpCall),
    (MCP_CALL_FAILED, EventGroup::McpCall),
    (MCP_CALL_IN_PROGRESS, EventGroup::McpCall),
    (MCP_LIST_TOOLS_COMPLETED, EventGroup::McpListTools),
    (MCP_LIST_TOOLS_FAILED, EventGroup::McpListTools),
    (MCP_LIST_TOOLS_IN_PROGRESS, EventGroup::McpListTools),
    (CODE_INTERPRETER_CALL_IN_PROGRESS, EventGroup::CodeInterpreter),
    (CODE_INTERPRETER_CALL_INTERPRETING, EventGroup::CodeInterpreter),
    (CODE_INTERPRETER_CALL_COMPLETED, EventGroup::CodeInterpreter),
    (CODE_INTERPRETER_CALL_CODE_DELTA, EventGroup::CodeInterpreter),
    (CODE_INTERPRETER_CALL_CODE_DONE, EventGroup::CodeInterpreter),
    (CUSTOM_TOOL_CALL_INPUT_DELTA, EventGroup::CustomToolInput),
    (CUSTOM_TOOL_CALL_INPUT_DONE, EventGroup::CustomToolInput),
    (ERROR, EventGroup::Error),
];

pub fn group_of(event_type: &str) -> EventGroup {
    ALL.iter()
        .find(|(t, _)| *t == event_type)
        .map(|(_, g)| *g)
        .unwrap_or(EventGroup::Unknown)
}

pub fn is_known(event_type: &str) -> bool {
    group_of(event_type) != EventGroup::Unknown
}

pub fn is_terminal(event_type: &str) -> bool {
    TERMINAL.contains(&event_type)
}
