//! Sample records loaded at startup when `SEED_SAMPLE_DATA` is on.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use secrecy::SecretString;

use crate::models::job::{EmploymentType, ExperienceLevel, JobPosition, JobStatus};
use crate::models::provider::{AuthType, McpProvider, ProviderCategory};
use crate::models::resume::{IndexStatus, IndexedResume};
use crate::models::task::{
    BasicInfo, Education, JobIntent, ParseErrorCode, ParseFailure, ParseTask, ParsedResume,
    PositionMatch, RecognitionType, ResumeFileStatus, Skills, TaskStatus, WorkExperience,
};
use crate::models::template::{ExportTemplate, FormatType, ToggleStatus};
use crate::store::{Repository, Store};

const ADMIN: &str = "系统管理员";

fn at(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .with_context(|| format!("bad seed timestamp '{raw}'"))?;
    Ok(naive.and_utc())
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Store {
    pub fn seeded() -> Result<Self> {
        Ok(Self {
            tasks: Repository::from_records(sample_tasks()?)?,
            resumes: Repository::from_records(sample_resumes()?)?,
            jobs: Repository::from_records(sample_jobs()?)?,
            templates: Repository::from_records(sample_templates()?)?,
            providers: Repository::from_records(sample_providers()?)?,
        })
    }
}

fn parsed(id: &str, filename: &str, name: &str, phone: &str, email: &str) -> ParsedResume {
    let mut r = ParsedResume::pending(id.to_string(), filename.to_string());
    r.status = ResumeFileStatus::Success;
    r.basic_info = Some(BasicInfo {
        name: name.to_string(),
        phone: phone.to_string(),
        email: email.to_string(),
    });
    r
}

fn failed(id: &str, filename: &str, code: ParseErrorCode, message: &str) -> ParsedResume {
    let mut r = ParsedResume::pending(id.to_string(), filename.to_string());
    r.status = ResumeFileStatus::Failed;
    r.error = Some(ParseFailure {
        code,
        message: message.to_string(),
    });
    r
}

pub fn sample_tasks() -> Result<Vec<ParseTask>> {
    let mut zhang = parsed(
        "res-001",
        "张三_简历_20260102.pdf",
        "张三",
        "138****5678",
        "zhangsan@example.com",
    );
    zhang.education = vec![Education {
        school: "清华大学".to_string(),
        degree: "硕士".to_string(),
        major: None,
        start_date: "2020-09".to_string(),
        end_date: "2023-06".to_string(),
    }];
    zhang.work_experience = vec![WorkExperience {
        company: "阿里巴巴集团".to_string(),
        position: "高级算法工程师".to_string(),
        start_date: "2023-07".to_string(),
        end_date: "至今".to_string(),
        responsibilities: strings(&["负责推荐系统优化"]),
        achievements: strings(&["CTR 提升 15%"]),
    }];
    zhang.skills = Some(Skills {
        hard_skills: strings(&["Python", "SQL"]),
        soft_skills: strings(&["沟通能力"]),
    });
    zhang.job_intent = Some(JobIntent {
        target_position: "AI产品经理".to_string(),
        preferred_location: "杭州".to_string(),
        expected_salary: None,
    });
    zhang.match_score = Some(78);
    zhang.warnings = strings(&["工作经历时间段与教育背景部分重叠"]);

    let mut li = parsed("res-101", "李四_简历.pdf", "李四", "139****1234", "lisi@xxx.com");
    li.match_score = Some(85);
    li.system_matched_positions = vec![
        PositionMatch {
            position: "前端工程师".to_string(),
            match_score: 92,
        },
        PositionMatch {
            position: "全栈工程师".to_string(),
            match_score: 88,
        },
        PositionMatch {
            position: "React开发工程师".to_string(),
            match_score: 85,
        },
    ];

    let mut wang = parsed(
        "res-003",
        "王五_简历_20260102.pdf",
        "王五",
        "136****9876",
        "wangwu@example.com",
    );
    wang.education = vec![
        Education {
            school: "北京大学".to_string(),
            degree: "本科".to_string(),
            major: Some("计算机科学与技术".to_string()),
            start_date: "2018-09".to_string(),
            end_date: "2022-06".to_string(),
        },
        Education {
            school: "斯坦福大学".to_string(),
            degree: "硕士".to_string(),
            major: Some("人工智能".to_string()),
            start_date: "2022-09".to_string(),
            end_date: "2024-06".to_string(),
        },
    ];
    wang.work_experience = vec![WorkExperience {
        company: "字节跳动".to_string(),
        position: "算法工程师".to_string(),
        start_date: "2024-07".to_string(),
        end_date: "至今".to_string(),
        responsibilities: strings(&["负责推荐算法优化", "参与大模型训练"]),
        achievements: strings(&["算法效率提升 20%", "发表论文 2 篇"]),
    }];
    wang.skills = Some(Skills {
        hard_skills: strings(&["Python", "PyTorch", "TensorFlow", "机器学习"]),
        soft_skills: strings(&["团队协作", "创新思维"]),
    });
    wang.system_matched_positions = vec![
        PositionMatch {
            position: "AI算法专家".to_string(),
            match_score: 95,
        },
        PositionMatch {
            position: "机器学习工程师".to_string(),
            match_score: 92,
        },
    ];

    Ok(vec![
        ParseTask {
            id: "task-002".to_string(),
            name: "2026校招_技术岗_批量解析".to_string(),
            status: TaskStatus::PartialFail,
            total_files: 50,
            success_count: 45,
            failed_count: 5,
            recognition_type: RecognitionType::System,
            target_position: None,
            resumes: vec![
                li,
                failed("res-201", "空文件.txt", ParseErrorCode::EmptyFile, "文件内容为空"),
                failed(
                    "res-202",
                    "超大简历扫描件.jpg",
                    ParseErrorCode::FileTooLarge,
                    "文件超过20MB限制",
                ),
            ],
            created_at: at("2026-01-02T15:20:00Z")?,
            updated_at: at("2026-01-02T16:20:00Z")?,
        },
        ParseTask {
            id: "task-001".to_string(),
            name: "张三_简历_20260102.pdf".to_string(),
            status: TaskStatus::Done,
            total_files: 1,
            success_count: 1,
            failed_count: 0,
            recognition_type: RecognitionType::Target,
            target_position: Some("AI产品经理".to_string()),
            resumes: vec![zhang],
            created_at: at("2026-01-02T14:30:00Z")?,
            updated_at: at("2026-01-02T15:30:00Z")?,
        },
        ParseTask {
            id: "task-003".to_string(),
            name: "王五_简历_20260102.pdf".to_string(),
            status: TaskStatus::Done,
            total_files: 1,
            success_count: 1,
            failed_count: 0,
            recognition_type: RecognitionType::System,
            target_position: None,
            resumes: vec![wang],
            created_at: at("2026-01-02T16:00:00Z")?,
            updated_at: at("2026-01-02T17:00:00Z")?,
        },
    ])
}

struct ResumeSeed<'a> {
    id: &'a str,
    name: &'a str,
    position: &'a str,
    parsed_at: &'a str,
    source: &'a str,
    match_score: u8,
    age: u32,
    location: &'a str,
    degree: &'a str,
    company: &'a str,
    work_years: u32,
    hard_skills: &'a [&'a str],
    matched_position: &'a str,
}

impl ResumeSeed<'_> {
    fn build(&self) -> Result<IndexedResume> {
        Ok(IndexedResume {
            id: self.id.to_string(),
            original_filename: format!("{}-{}.pdf", self.name, self.position),
            parsed_at: at(self.parsed_at)?,
            source: self.source.to_string(),
            status: IndexStatus::Parsed,
            match_score: Some(self.match_score),
            name: self.name.to_string(),
            phone: format!("138****{:0>4}", self.id),
            email: format!("candidate{}@example.com", self.id),
            age: Some(self.age),
            location: self.location.to_string(),
            highest_degree: self.degree.to_string(),
            schools: Vec::new(),
            major: String::new(),
            current_company: self.company.to_string(),
            current_position: self.position.to_string(),
            work_years: self.work_years,
            companies: vec![self.company.to_string()],
            hard_skills: strings(self.hard_skills),
            soft_skills: Vec::new(),
            languages: strings(&["中文"]),
            target_position: Some(self.position.to_string()),
            matched_position: Some(self.matched_position.to_string()),
        })
    }
}

pub fn sample_resumes() -> Result<Vec<IndexedResume>> {
    let seeds = [
        ResumeSeed {
            id: "1",
            name: "张三",
            position: "高级前端工程师",
            parsed_at: "2024-01-15 10:30:00",
            source: "BOSS直聘",
            match_score: 85,
            age: 28,
            location: "北京",
            degree: "本科",
            company: "ABC科技有限公司",
            work_years: 5,
            hard_skills: &["React", "TypeScript", "JavaScript", "CSS", "HTML"],
            matched_position: "前端开发工程师",
        },
        ResumeSeed {
            id: "2",
            name: "李四",
            position: "后端架构师",
            parsed_at: "2024-01-14 15:20:00",
            source: "内部推荐",
            match_score: 92,
            age: 30,
            location: "上海",
            degree: "硕士",
            company: "DEF软件公司",
            work_years: 7,
            hard_skills: &["Java", "Spring Boot", "MySQL", "Redis", "Docker"],
            matched_position: "Java开发工程师",
        },
        ResumeSeed {
            id: "3",
            name: "王五",
            position: "高级产品经理",
            parsed_at: "2024-01-13 09:45:00",
            source: "BOSS直聘",
            match_score: 78,
            age: 27,
            location: "深圳",
            degree: "本科",
            company: "MNO科技公司",
            work_years: 4,
            hard_skills: &["Axure", "Figma", "SQL", "数据分析"],
            matched_position: "产品策划经理",
        },
        ResumeSeed {
            id: "4",
            name: "赵六",
            position: "UI设计师",
            parsed_at: "2024-01-12 16:30:00",
            source: "批量上传",
            match_score: 88,
            age: 26,
            location: "广州",
            degree: "本科",
            company: "STU设计公司",
            work_years: 3,
            hard_skills: &["Figma", "Sketch", "Photoshop", "Illustrator", "AE"],
            matched_position: "UI/UX设计师",
        },
        ResumeSeed {
            id: "5",
            name: "钱七",
            position: "高级数据分析师",
            parsed_at: "2024-01-11 11:15:00",
            source: "BOSS直聘",
            match_score: 80,
            age: 29,
            location: "杭州",
            degree: "硕士",
            company: "YZA数据公司",
            work_years: 6,
            hard_skills: &["Python", "SQL", "Excel", "Tableau", "R"],
            matched_position: "数据挖掘工程师",
        },
        ResumeSeed {
            id: "6",
            name: "孙八",
            position: "运维工程师",
            parsed_at: "2024-01-10 14:25:00",
            source: "内部推荐",
            match_score: 75,
            age: 31,
            location: "成都",
            degree: "本科",
            company: "HIJ云服务公司",
            work_years: 8,
            hard_skills: &["Linux", "Docker", "Kubernetes", "AWS", "Jenkins"],
            matched_position: "DevOps工程师",
        },
        ResumeSeed {
            id: "7",
            name: "周九",
            position: "测试工程师",
            parsed_at: "2024-01-09 13:40:00",
            source: "BOSS直聘",
            match_score: 82,
            age: 25,
            location: "西安",
            degree: "本科",
            company: "QRS软件公司",
            work_years: 2,
            hard_skills: &["Selenium", "JMeter", "Postman", "Python", "SQL"],
            matched_position: "自动化测试工程师",
        },
        ResumeSeed {
            id: "8",
            name: "吴十",
            position: "算法专家",
            parsed_at: "2024-01-08 10:50:00",
            source: "批量上传",
            match_score: 95,
            age: 32,
            location: "北京",
            degree: "博士",
            company: "TUV科技公司",
            work_years: 9,
            hard_skills: &["Python", "TensorFlow", "PyTorch", "机器学习", "深度学习"],
            matched_position: "机器学习工程师",
        },
        ResumeSeed {
            id: "9",
            name: "刘一",
            position: "前端工程师",
            parsed_at: "2024-01-07 17:20:00",
            source: "BOSS直聘",
            match_score: 70,
            age: 24,
            location: "南京",
            degree: "本科",
            company: "CDE互联网公司",
            work_years: 1,
            hard_skills: &["Vue.js", "JavaScript", "CSS", "HTML", "Webpack"],
            matched_position: "前端开发工程师",
        },
        ResumeSeed {
            id: "10",
            name: "陈二",
            position: "项目经理",
            parsed_at: "2024-01-06 09:10:00",
            source: "内部推荐",
            match_score: 87,
            age: 33,
            location: "武汉",
            degree: "硕士",
            company: "FGH咨询公司",
            work_years: 10,
            hard_skills: &["PMP", "项目管理", "敏捷开发", "风险控制", "预算管理"],
            matched_position: "项目管理专家",
        },
    ];
    let mut resumes = seeds
        .iter()
        .map(ResumeSeed::build)
        .collect::<Result<Vec<_>>>()?;

    // One résumé that has not been matched yet.
    if let Some(last) = resumes.last_mut() {
        last.match_score = None;
        last.matched_position = None;
    }
    Ok(resumes)
}

pub fn sample_jobs() -> Result<Vec<JobPosition>> {
    Ok(vec![
        JobPosition {
            id: "job-001".to_string(),
            name: "前端工程师".to_string(),
            department: "技术研发部".to_string(),
            status: JobStatus::Active,
            work_location: "北京".to_string(),
            employment_type: EmploymentType::FullTime,
            experience_level: ExperienceLevel::Mid,
            salary_range: "15000-25000".to_string(),
            description: "负责公司产品的前端开发工作，参与产品设计和优化。".to_string(),
            responsibilities: strings(&[
                "负责公司产品的前端开发和维护",
                "与UI设计师、后端工程师协作完成产品开发",
                "优化前端性能，提升用户体验",
            ]),
            qualifications: strings(&[
                "本科及以上学历，计算机相关专业",
                "3年以上前端开发经验",
                "熟练掌握HTML、CSS、JavaScript",
            ]),
            required_skills: strings(&["React", "TypeScript", "Webpack"]),
            preferred_skills: strings(&["Node.js", "GraphQL"]),
            education_requirement: "本科及以上".to_string(),
            major_preference: "计算机相关专业".to_string(),
            created_at: at("2023-01-15T09:00:00Z")?,
            updated_at: at("2023-05-10T14:30:00Z")?,
        },
        JobPosition {
            id: "job-002".to_string(),
            name: "产品经理".to_string(),
            department: "产品部".to_string(),
            status: JobStatus::Draft,
            work_location: "上海".to_string(),
            employment_type: EmploymentType::FullTime,
            experience_level: ExperienceLevel::Senior,
            salary_range: "20000-35000".to_string(),
            description: "负责产品规划、需求分析和产品生命周期管理。".to_string(),
            responsibilities: strings(&[
                "负责产品规划和需求分析",
                "协调开发团队完成产品开发",
                "跟踪产品上线后的数据和反馈",
            ]),
            qualifications: strings(&[
                "5年以上产品管理经验",
                "熟悉产品开发流程",
                "具备良好的沟通协调能力",
            ]),
            required_skills: strings(&["Axure", "PRD文档编写", "数据分析"]),
            preferred_skills: strings(&["用户研究", "增长黑客"]),
            education_requirement: "本科及以上".to_string(),
            major_preference: "不限".to_string(),
            created_at: at("2023-02-20T10:15:00Z")?,
            updated_at: at("2023-04-12T11:20:00Z")?,
        },
        JobPosition {
            id: "job-003".to_string(),
            name: "UI设计师".to_string(),
            department: "设计部".to_string(),
            status: JobStatus::Closed,
            work_location: "深圳".to_string(),
            employment_type: EmploymentType::PartTime,
            experience_level: ExperienceLevel::Entry,
            salary_range: "8000-12000".to_string(),
            description: "负责公司产品的界面设计和用户体验优化。".to_string(),
            responsibilities: strings(&[
                "负责产品界面设计",
                "制定设计规范和组件库",
                "参与用户体验优化",
            ]),
            qualifications: strings(&[
                "2年以上UI设计经验",
                "熟练使用Figma、Sketch等设计工具",
                "具备良好的审美能力",
            ]),
            required_skills: strings(&["Figma", "Sketch", "Photoshop"]),
            preferred_skills: strings(&["用户研究", "交互设计"]),
            education_requirement: "大专及以上".to_string(),
            major_preference: "设计相关专业".to_string(),
            created_at: at("2023-03-01T08:45:00Z")?,
            updated_at: at("2023-05-05T16:40:00Z")?,
        },
    ])
}

const STANDARD_JSON_TEMPLATE: &str = r#"{
  "basicInfo": {
    "name": "{{name}}",
    "phone": "{{phone}}",
    "email": "{{email}}"
  },
  "education": [
    {
      "school": "{{school}}",
      "degree": "{{degree}}",
      "startDate": "{{startDate}}",
      "endDate": "{{endDate}}"
    }
  ],
  "workExperience": [
    {
      "company": "{{company}}",
      "position": "{{position}}",
      "responsibilities": ["{{responsibility}}"],
      "achievements": ["{{achievement}}"]
    }
  ]
}"#;

const COMPACT_XML_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<resume>
  <basicInfo>
    <name>{{name}}</name>
    <phone>{{phone}}</phone>
    <email>{{email}}</email>
  </basicInfo>
  <education>
    <item>
      <school>{{school}}</school>
      <degree>{{degree}}</degree>
      <startDate>{{startDate}}</startDate>
      <endDate>{{endDate}}</endDate>
    </item>
  </education>
</resume>"#;

const LEGACY_TEMPLATE: &str = r#"{
  "personalInfo": {
    "name": "{{name}}",
    "contact": "{{phone}}"
  }
}"#;

pub fn sample_templates() -> Result<Vec<ExportTemplate>> {
    Ok(vec![
        ExportTemplate {
            id: "temp-001".to_string(),
            name: "标准JSON格式模板".to_string(),
            format_type: FormatType::Json,
            status: ToggleStatus::Enabled,
            description: Some("标准的JSON格式输出，包含所有简历字段".to_string()),
            content: STANDARD_JSON_TEMPLATE.to_string(),
            is_default: true,
            created_by: ADMIN.to_string(),
            created_at: at("2023-01-15T10:00:00Z")?,
            updated_at: at("2023-01-15T10:00:00Z")?,
        },
        ExportTemplate {
            id: "temp-002".to_string(),
            name: "精简XML格式模板".to_string(),
            format_type: FormatType::Xml,
            status: ToggleStatus::Enabled,
            description: Some("精简的XML格式，适合系统间数据交换".to_string()),
            content: COMPACT_XML_TEMPLATE.to_string(),
            is_default: true,
            created_by: ADMIN.to_string(),
            created_at: at("2023-02-20T14:30:00Z")?,
            updated_at: at("2023-02-20T14:30:00Z")?,
        },
        ExportTemplate {
            id: "temp-003".to_string(),
            name: "停用的旧版模板".to_string(),
            format_type: FormatType::Json,
            status: ToggleStatus::Disabled,
            description: Some("旧版导出模板，已停用".to_string()),
            content: LEGACY_TEMPLATE.to_string(),
            is_default: false,
            created_by: ADMIN.to_string(),
            created_at: at("2023-03-10T09:15:00Z")?,
            updated_at: at("2023-03-10T09:15:00Z")?,
        },
    ])
}

pub fn sample_providers() -> Result<Vec<McpProvider>> {
    Ok(vec![
        McpProvider {
            id: "mcp-001".to_string(),
            name: "学信网学历验证服务".to_string(),
            category: ProviderCategory::EducationVerification,
            status: ToggleStatus::Enabled,
            endpoint_url: "https://api.chsi.com.cn/verify".to_string(),
            auth_type: AuthType::ApiKey,
            api_key: Some(SecretString::from("sample-chsi-key")),
            description: Some("官方学信网学历验证服务，支持学位和学历信息验证".to_string()),
            timeout_ms: 5000,
            retry_count: 2,
            is_enabled_by_default: true,
            created_by: ADMIN.to_string(),
            created_at: at("2023-01-15T10:00:00Z")?,
            updated_at: at("2023-01-15T10:00:00Z")?,
        },
        McpProvider {
            id: "mcp-002".to_string(),
            name: "公安身份核验服务".to_string(),
            category: ProviderCategory::IdentityVerification,
            status: ToggleStatus::Enabled,
            endpoint_url: "https://api.gongan.gov.cn/id-verify".to_string(),
            auth_type: AuthType::BearerToken,
            api_key: Some(SecretString::from("sample-bearer-token")),
            description: Some("公安部门提供的身份信息核验服务".to_string()),
            timeout_ms: 3000,
            retry_count: 1,
            is_enabled_by_default: true,
            created_by: ADMIN.to_string(),
            created_at: at("2023-02-20T14:30:00Z")?,
            updated_at: at("2023-02-20T14:30:00Z")?,
        },
        McpProvider {
            id: "mcp-003".to_string(),
            name: "自定义背景调查服务".to_string(),
            category: ProviderCategory::Custom,
            status: ToggleStatus::Disabled,
            endpoint_url: "https://api.custom-bg-check.com/verify".to_string(),
            auth_type: AuthType::BasicAuth,
            api_key: Some(SecretString::from("bgcheck:sample-password")),
            description: Some("第三方背景调查服务，支持工作经历验证".to_string()),
            timeout_ms: 10000,
            retry_count: 3,
            is_enabled_by_default: false,
            created_by: ADMIN.to_string(),
            created_at: at("2023-03-10T09:15:00Z")?,
            updated_at: at("2023-03-10T09:15:00Z")?,
        },
    ])
}
