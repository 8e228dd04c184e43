use clap::{ Parser, Subcommand };

use crate::models::diagnosis::MedicalRecord;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Base URL of the AssistDoctor service. Falls back to $ASSIST_DOCTOR_BASE_URL, then http://10.4.0.141:8000.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Chat with the assistant. Starts an interactive session unless --query is given.
    Chat {
        /// Ask a single question, print the streamed answer and exit.
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Diagnose from an electronic medical record and print the JSON result.
    Diagnose {
        /// 主诉
        #[arg(long)]
        chief_complaint: Option<String>,

        /// 现病史
        #[arg(long)]
        present_illness: Option<String>,

        /// 既往史
        #[arg(long)]
        past_history: Option<String>,

        /// 查体
        #[arg(long)]
        physical_exam: Option<String>,

        /// 辅助检查
        #[arg(long)]
        auxiliary_exam: Option<String>,
    },
}

impl Command {
    /// The medical record carried by `diagnose`, if this is that command.
    pub fn medical_record(&self) -> Option<MedicalRecord> {
        match self {
            Command::Diagnose {
                chief_complaint,
                present_illness,
                past_history,
                physical_exam,
                auxiliary_exam,
            } =>
                Some(MedicalRecord {
                    chief_complaint: chief_complaint.clone(),
                    present_illness: present_illness.clone(),
                    past_history: past_history.clone(),
                    physical_exam: physical_exam.clone(),
                    auxiliary_exam: auxiliary_exam.clone(),
                }),
            Command::Chat { .. } => None,
        }
    }
}
